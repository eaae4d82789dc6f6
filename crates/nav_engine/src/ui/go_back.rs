//! One-shot go-back handlers
//!
//! Windows that need to intercept the back gesture (unsaved changes, an open
//! dropdown) register a handler once. Every registered handler runs on the
//! next go-back and is then forgotten; a handler that wants to keep
//! intercepting registers itself again while it runs.

use std::rc::Rc;

/// Result of a go-back handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoBackAction {
    /// Let the navigation proceed
    Continue,
    /// Cancel this go-back
    Abort,
}

/// Shared go-back handler, identified by its `Rc`
pub type GoBackHandler = Rc<dyn Fn() -> GoBackAction>;

/// Ordered set of one-shot handlers
#[derive(Default)]
pub struct GoBackHandlers {
    handlers: Vec<GoBackHandler>,
}

impl GoBackHandlers {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`; returns `false` if it is already registered
    pub fn register(&mut self, handler: GoBackHandler) -> bool {
        if self.contains(&handler) {
            return false;
        }
        self.handlers.push(handler);
        true
    }

    /// Unregister `handler`; returns whether it was registered
    pub fn unregister(&mut self, handler: &GoBackHandler) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|h| !Rc::ptr_eq(h, handler));
        before != self.handlers.len()
    }

    /// Whether `handler` is registered
    pub fn contains(&self, handler: &GoBackHandler) -> bool {
        self.handlers.iter().any(|h| Rc::ptr_eq(h, handler))
    }

    /// Take every handler, leaving the set empty
    pub fn take(&mut self) -> Vec<GoBackHandler> {
        std::mem::take(&mut self.handlers)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Forget every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

/// Run `handlers` in order; any `Abort` cancels the go-back
///
/// All handlers run even after one aborts, since each is consumed.
pub fn run_handlers(handlers: &[GoBackHandler]) -> GoBackAction {
    let mut action = GoBackAction::Continue;
    for handler in handlers {
        if handler() == GoBackAction::Abort {
            action = GoBackAction::Abort;
        }
    }
    action
}

//! Subscription owners and liveness

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// An object whose lifetime is managed by the host rather than by reference counting
pub trait HostObject: Send + Sync {
    /// Whether the host has torn the object down
    fn is_destroyed(&self) -> bool;
}

#[derive(Debug, Default)]
struct TokenState {
    destroyed: AtomicBool,
}

impl HostObject for TokenState {
    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

/// Liveness token owned by a subscriber
///
/// Clones share the same state, so a component can hand a clone to the hub
/// and call [`destroy`](Self::destroy) from its own teardown.
#[derive(Debug, Clone, Default)]
pub struct LifeToken {
    state: Arc<TokenState>,
}

impl LifeToken {
    /// Create a live token
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the owner as destroyed
    pub fn destroy(&self) {
        self.state.destroyed.store(true, Ordering::Release);
    }

    /// Whether [`destroy`](Self::destroy) has been called on any clone
    pub fn is_destroyed(&self) -> bool {
        self.state.is_destroyed()
    }
}

/// Identity of a subscription owner, stable for the owner's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerKey(usize);

/// Owner reference held by a subscription
///
/// Exactly one representation is active per subscription.
#[derive(Clone)]
pub enum Owner {
    /// Weak reference to a reference-counted object
    Weak(Weak<dyn Any + Send + Sync>),
    /// Object destroyed explicitly by the host
    Hosted(Arc<dyn HostObject>),
}

impl Owner {
    /// Owner backed by a host-managed object
    pub fn hosted(object: Arc<dyn HostObject>) -> Self {
        Self::Hosted(object)
    }

    /// Whether subscriptions of this owner should still receive messages
    pub fn is_alive(&self) -> bool {
        match self {
            Self::Weak(weak) => weak.strong_count() > 0,
            Self::Hosted(object) => !object.is_destroyed(),
        }
    }

    /// Identity of the owner
    pub fn key(&self) -> OwnerKey {
        let address = match self {
            Self::Weak(weak) => weak.as_ptr().cast::<()>() as usize,
            Self::Hosted(object) => Arc::as_ptr(object).cast::<()>() as usize,
        };
        OwnerKey(address)
    }

    /// Short label used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Weak(_) => "weak",
            Self::Hosted(_) => "hosted",
        }
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("kind", &self.kind())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Anything that can own hub subscriptions
pub trait AsOwner {
    /// Owner reference to store in a subscription
    fn as_owner(&self) -> Owner;
}

impl AsOwner for Owner {
    fn as_owner(&self) -> Owner {
        self.clone()
    }
}

impl AsOwner for LifeToken {
    fn as_owner(&self) -> Owner {
        let state: Arc<dyn HostObject> = self.state.clone();
        Owner::Hosted(state)
    }
}

impl<T: Any + Send + Sync> AsOwner for Arc<T> {
    fn as_owner(&self) -> Owner {
        let weak: Weak<T> = Arc::downgrade(self);
        let weak: Weak<dyn Any + Send + Sync> = weak;
        Owner::Weak(weak)
    }
}

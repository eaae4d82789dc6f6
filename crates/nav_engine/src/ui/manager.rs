//! Window Manager
//!
//! LIFO navigation stack over logical windows. Index 0 of the stack is the
//! visible window; entries below it are hidden and come back on `go_back`.
//! A separate cache keeps every window instantiated in the current scene so
//! repeated navigation reuses views instead of instantiating them again.
//!
//! Windows bound to another scene are shown in two steps: `show_window`
//! starts the scene load and records the window as pending, and the show
//! completes when the loader reports the scene loaded. While a window is
//! pending, requests for other windows are dropped.
//!
//! The manager is single threaded. Only one top-level operation runs at a
//! time; calling back into the manager from a view or a go-back handler while
//! an operation is running is a wiring bug and panics.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use thiserror::Error;

use super::go_back::{run_handlers, GoBackAction, GoBackHandler, GoBackHandlers};
use super::view::{AppHost, ViewFactory, WindowView};
use super::window::WindowRef;
use crate::core::config::{DuplicateTopPolicy, NavigationConfig};
use crate::foundation::collections::{new_key_type, remove_key, HandleMap};
use crate::input::BackButton;
use crate::scene::{SceneError, SceneLoader};

new_key_type! {
    struct WindowKey;
}

/// Window navigation errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// Scene loader refused the load
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Window requested on top of an entry for the same window
    #[error("Window {0} requested on top of itself")]
    DuplicateTop(String),
}

/// Lifecycle state of a window instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Placeholder without a view
    Uninstantiated,
    /// On top and shown
    Visible,
    /// Instantiated but hidden
    Hidden,
    /// View destroyed by a scene unload
    Invalidated,
}

struct WindowInstance {
    window: WindowRef,
    view: Option<Box<dyn WindowView>>,
    valid: bool,
    instantiated: bool,
}

impl WindowInstance {
    fn new(window: WindowRef, view: Box<dyn WindowView>) -> Self {
        Self {
            window,
            view: Some(view),
            valid: true,
            instantiated: true,
        }
    }

    fn placeholder(window: WindowRef) -> Self {
        Self {
            window,
            view: None,
            valid: false,
            instantiated: false,
        }
    }

    fn invalidate(&mut self) {
        self.view = None;
        self.valid = false;
    }

    fn state(&self) -> WindowState {
        if !self.valid {
            return if self.instantiated {
                WindowState::Invalidated
            } else {
                WindowState::Uninstantiated
            };
        }
        match &self.view {
            Some(view) if view.is_active() => WindowState::Visible,
            _ => WindowState::Hidden,
        }
    }
}

#[derive(Default)]
struct NavState {
    instances: HandleMap<WindowKey, WindowInstance>,
    stack: Vec<WindowKey>,
    known: Vec<WindowKey>,
    pending: Option<WindowRef>,
}

struct Services {
    scene_loader: Box<dyn SceneLoader>,
    view_factory: Box<dyn ViewFactory>,
    host: Box<dyn AppHost>,
}

struct Inner {
    config: NavigationConfig,
    running: Cell<Option<&'static str>>,
    state: RefCell<NavState>,
    services: RefCell<Services>,
    go_back_handlers: RefCell<GoBackHandlers>,
}

struct OperationGuard<'a> {
    running: &'a Cell<Option<&'static str>>,
}

impl<'a> OperationGuard<'a> {
    fn enter(running: &'a Cell<Option<&'static str>>, operation: &'static str) -> Self {
        let active = running.get();
        assert!(
            active.is_none(),
            "WindowManager::{operation} called while {} is running",
            active.unwrap_or_default()
        );
        running.set(Some(operation));
        Self { running }
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.running.set(None);
    }
}

/// Stack algorithms, run with state and collaborators borrowed
struct Navigator<'a> {
    config: &'a NavigationConfig,
    state: &'a mut NavState,
    services: &'a mut Services,
}

impl Navigator<'_> {
    fn top(&self) -> Option<WindowKey> {
        self.state.stack.first().copied()
    }

    fn is_visible(&self, window: &WindowRef) -> bool {
        self.top().is_some_and(|key| {
            let instance = &self.state.instances[key];
            instance.window == *window && instance.valid
        })
    }

    fn set_active(&mut self, key: WindowKey, active: bool) {
        if let Some(view) = self.state.instances[key].view.as_mut() {
            view.set_active(active);
        }
    }

    fn release_if_untracked(&mut self, key: WindowKey) {
        if !self.state.stack.contains(&key) && !self.state.known.contains(&key) {
            self.state.instances.remove(key);
        }
    }

    fn pop_and_hide(&mut self) -> WindowRef {
        assert!(!self.state.stack.is_empty(), "Pop from an empty window stack");
        let key = self.state.stack.remove(0);
        self.set_active(key, false);
        let window = self.state.instances[key].window.clone();
        self.release_if_untracked(key);
        window
    }

    fn invalidate_all(&mut self) {
        for (_, instance) in &mut self.state.instances {
            instance.invalidate();
        }
    }

    fn begin_scene_load(&mut self, window: &WindowRef) -> Result<(), WindowError> {
        self.services.scene_loader.load_scene(window)?;
        if let Some(previous) = self.state.pending.replace(window.clone()) {
            log::debug!("Pending window {} replaced by {}", previous.name(), window.name());
        }
        self.invalidate_all();
        log::debug!("Window {} waits for its scene", window.name());
        Ok(())
    }

    fn collapse_duplicates(&mut self, window: &WindowRef) {
        let duplicates: Vec<WindowKey> = self
            .state
            .stack
            .iter()
            .copied()
            .filter(|key| self.state.instances[*key].window == *window)
            .collect();
        for key in duplicates {
            log::warn!("Window {} already on the stack, collapsing", window.name());
            remove_key(&mut self.state.stack, key);
            self.set_active(key, false);
            self.release_if_untracked(key);
        }
    }

    fn known_or_instantiate(&mut self, window: &WindowRef) -> WindowKey {
        let known = self.state.known.iter().copied().find(|key| {
            let instance = &self.state.instances[*key];
            instance.window == *window && instance.valid
        });
        if let Some(key) = known {
            log::trace!("Reuse window {}", window.name());
            return key;
        }
        log::debug!("Instantiate window {} from {}", window.name(), window.source().name());
        let view = self.services.view_factory.instantiate(window);
        let key = self.state.instances.insert(WindowInstance::new(window.clone(), view));
        self.state.known.push(key);
        key
    }

    fn show(&mut self, window: &WindowRef) -> Result<(), WindowError> {
        if let Some(pending) = &self.state.pending {
            if pending == window {
                log::debug!("Window {} is already waiting for its scene", window.name());
            } else {
                log::debug!(
                    "Drop request for {} while {} waits for its scene",
                    window.name(),
                    pending.name()
                );
            }
            return Ok(());
        }
        if self.services.scene_loader.needs_scene_load(window) {
            return self.begin_scene_load(window);
        }
        self.present(window)
    }

    /// Show steps once the window's scene is known to be loaded
    fn present(&mut self, window: &WindowRef) -> Result<(), WindowError> {
        if self.is_visible(window) {
            log::trace!("Window {} is already visible", window.name());
            return Ok(());
        }

        if let Some(previous) = self.top() {
            let previous_window = self.state.instances[previous].window.clone();
            if previous_window.is_pop_out() {
                log::debug!("Pop out window {}", previous_window.name());
                self.pop_and_hide();
            } else if previous_window == *window {
                match self.config.duplicate_top {
                    DuplicateTopPolicy::Heal => {
                        log::warn!("Window {} shown on top of itself, popping the stale entry", window.name());
                        self.pop_and_hide();
                    }
                    DuplicateTopPolicy::Reject => {
                        return Err(WindowError::DuplicateTop(window.name().to_string()));
                    }
                }
            } else {
                self.set_active(previous, false);
            }
        }

        self.collapse_duplicates(window);
        let key = self.known_or_instantiate(window);
        self.state.stack.insert(0, key);
        log::debug!("Show window {} (depth {})", window.name(), self.state.stack.len());
        self.set_active(key, true);
        Ok(())
    }

    fn go_back(&mut self) -> Result<(), WindowError> {
        if let Some(pending) = &self.state.pending {
            log::debug!("Drop go back while {} waits for its scene", pending.name());
            return Ok(());
        }
        if self.state.stack.len() <= 1 {
            if self.config.exit_on_last_back {
                log::info!("Back from the last window, requesting exit");
                self.services.host.request_exit();
            } else {
                log::debug!("Back from the last window ignored");
            }
            return Ok(());
        }

        let next = self.state.stack[1];
        let window = self.state.instances[next].window.clone();
        if self.state.instances[next].valid {
            let left = self.pop_and_hide();
            log::debug!("Back from {} to {}", left.name(), window.name());
            self.set_active(next, true);
            return Ok(());
        }

        // Stale entry. The scene load starts before the stack changes; a
        // loader error leaves the stack unchanged.
        let reload = window.is_scene_window() || self.services.scene_loader.needs_scene_load(&window);
        if reload {
            log::info!("Reload scene of window {}", window.name());
            self.begin_scene_load(&window)?;
        }
        let left = self.pop_and_hide();
        log::debug!("Back from {} to stale {}", left.name(), window.name());
        // The stale entry is pushed again once the window is shown.
        self.state.stack.remove(0);
        self.release_if_untracked(next);
        if reload {
            Ok(())
        } else {
            self.present(&window)
        }
    }

    fn unwind(&mut self, target: Option<&WindowRef>) {
        let Some(target) = target else {
            log::debug!("Unwind {} window(s)", self.state.stack.len());
            while !self.state.stack.is_empty() {
                self.pop_and_hide();
            }
            return;
        };
        let Some(top) = self.top() else {
            log::warn!("Unwind to {} on an empty stack", target.name());
            return;
        };
        if self.state.instances[top].window == *target {
            log::debug!("Unwind target {} is the current window", target.name());
            return;
        }

        while self.state.stack.len() > 1 {
            let key = self.state.stack[1];
            if self.state.instances[key].window == *target {
                log::debug!("Unwound to {}", target.name());
                return;
            }
            self.state.stack.remove(1);
            self.set_active(key, false);
            self.release_if_untracked(key);
        }

        log::debug!("Unwind target {} not on the stack, adding placeholder", target.name());
        let key = self.state.instances.insert(WindowInstance::placeholder(target.clone()));
        self.state.stack.insert(1, key);
    }

    fn scene_loaded(&mut self, scene_name: &str) -> Result<(), WindowError> {
        self.services.scene_loader.scene_loaded(scene_name);

        // Views invalidated by the unload belonged to the previous scene.
        let stale: Vec<WindowKey> = self
            .state
            .known
            .iter()
            .copied()
            .filter(|key| !self.state.instances[*key].valid)
            .collect();
        for key in stale {
            remove_key(&mut self.state.known, key);
            self.release_if_untracked(key);
        }

        let Some(pending) = self.state.pending.clone() else {
            log::debug!("Scene {scene_name} loaded, no window waiting");
            return Ok(());
        };
        if pending.scene().is_some_and(|scene| scene.scene_name == scene_name) {
            self.state.pending = None;
            self.present(&pending)
        } else {
            log::debug!("Scene {scene_name} loaded while {} waits for another scene", pending.name());
            Ok(())
        }
    }
}

/// Navigation stack over logical windows
///
/// Cloning yields another handle to the same stack, so views and go-back
/// handlers can keep one.
#[derive(Clone)]
pub struct WindowManager {
    inner: Rc<Inner>,
}

impl WindowManager {
    /// Create an empty stack over the given collaborators
    pub fn new(
        config: NavigationConfig,
        scene_loader: Box<dyn SceneLoader>,
        view_factory: Box<dyn ViewFactory>,
        host: Box<dyn AppHost>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                config,
                running: Cell::new(None),
                state: RefCell::new(NavState::default()),
                services: RefCell::new(Services {
                    scene_loader,
                    view_factory,
                    host,
                }),
                go_back_handlers: RefCell::new(GoBackHandlers::new()),
            }),
        }
    }

    /// Navigation configuration
    pub fn config(&self) -> &NavigationConfig {
        &self.inner.config
    }

    fn enter(&self, operation: &'static str) -> OperationGuard<'_> {
        OperationGuard::enter(&self.inner.running, operation)
    }

    fn read_state(&self) -> Ref<'_, NavState> {
        match self.inner.state.try_borrow() {
            Ok(state) => state,
            Err(_) => panic!(
                "WindowManager queried while {} is running",
                self.inner.running.get().unwrap_or_default()
            ),
        }
    }

    fn with_navigator<R>(&self, f: impl FnOnce(&mut Navigator<'_>) -> R) -> R {
        let mut state = self.inner.state.borrow_mut();
        let mut services = self.inner.services.borrow_mut();
        let mut navigator = Navigator {
            config: &self.inner.config,
            state: &mut state,
            services: &mut services,
        };
        f(&mut navigator)
    }

    /// Show `window`, hiding or popping the current one
    ///
    /// If the window needs another scene, the scene load starts and the show
    /// completes once the load is reported. Loader errors propagate.
    pub fn show_window(&self, window: &WindowRef) -> Result<(), WindowError> {
        let _guard = self.enter("show_window");
        self.with_navigator(|nav| nav.show(window))
    }

    /// Navigate back
    ///
    /// One-shot go-back handlers run first and may abort. Going back from the
    /// last window requests application exit.
    pub fn go_back(&self) -> Result<(), WindowError> {
        let _guard = self.enter("go_back");
        let handlers = self.inner.go_back_handlers.borrow_mut().take();
        if !handlers.is_empty() {
            log::debug!("Running {} go-back handler(s)", handlers.len());
            if run_handlers(&handlers) == GoBackAction::Abort {
                log::debug!("Go back aborted by handler");
                return Ok(());
            }
        }
        self.with_navigator(|nav| nav.go_back())
    }

    /// Prepare the stack so that the next `go_back` lands on `target`
    ///
    /// Entries between the current window and `target` are dropped. If
    /// `target` is not on the stack a placeholder is inserted under the
    /// current window and instantiated when reached. `None` clears the stack.
    pub fn unwind(&self, target: Option<&WindowRef>) {
        let _guard = self.enter("unwind");
        self.with_navigator(|nav| nav.unwind(target));
    }

    /// Pop and hide the current window without showing the next one
    pub fn pop_current_window(&self) {
        let _guard = self.enter("pop_current_window");
        self.with_navigator(|nav| {
            if nav.state.stack.is_empty() {
                log::trace!("Pop on an empty window stack ignored");
            } else {
                nav.pop_and_hide();
            }
        });
    }

    /// Complete a pending show once `scene_name` finished loading
    pub fn on_scene_loaded(&self, scene_name: &str) -> Result<(), WindowError> {
        let _guard = self.enter("on_scene_loaded");
        self.with_navigator(|nav| nav.scene_loaded(scene_name))
    }

    /// Per-frame pump: forward a finished scene load from the loader
    pub fn update(&self) -> Result<(), WindowError> {
        let _guard = self.enter("update");
        let loaded = self.inner.services.borrow_mut().scene_loader.poll_loaded();
        match loaded {
            Some(scene_name) => self.with_navigator(|nav| nav.scene_loaded(&scene_name)),
            None => Ok(()),
        }
    }

    /// Register a one-shot go-back handler; returns `false` if already registered
    ///
    /// Handlers may register themselves again while running.
    pub fn register_go_back_handler_once(&self, handler: GoBackHandler) -> bool {
        self.inner.go_back_handlers.borrow_mut().register(handler)
    }

    /// Unregister a go-back handler; returns whether it was registered
    pub fn unregister_go_back_handler_once(&self, handler: &GoBackHandler) -> bool {
        self.inner.go_back_handlers.borrow_mut().unregister(handler)
    }

    /// Number of registered go-back handlers
    pub fn go_back_handler_count(&self) -> usize {
        self.inner.go_back_handlers.borrow().len()
    }

    /// Route back gestures of `button` to [`go_back`](Self::go_back)
    ///
    /// The callback holds a weak handle; it does nothing once every manager
    /// handle is dropped.
    pub fn bind_back_button(&self, button: &mut BackButton) {
        let weak = Rc::downgrade(&self.inner);
        button.set_callback(move || {
            let Some(inner) = weak.upgrade() else {
                log::debug!("Back gesture after the window manager was dropped");
                return;
            };
            if let Err(err) = (Self { inner }).go_back() {
                log::error!("Go back failed: {err}");
            }
        });
    }

    /// Current (visible) window
    pub fn current_window(&self) -> Option<WindowRef> {
        let state = self.read_state();
        state.stack.first().map(|key| state.instances[*key].window.clone())
    }

    /// Stack depth
    pub fn window_count(&self) -> usize {
        self.read_state().stack.len()
    }

    /// Window names from top to bottom
    pub fn stack_names(&self) -> Vec<String> {
        let state = self.read_state();
        state
            .stack
            .iter()
            .map(|key| state.instances[*key].window.name().to_string())
            .collect()
    }

    /// Number of cached window instances
    pub fn known_window_count(&self) -> usize {
        self.read_state().known.len()
    }

    /// Window waiting for its scene to load
    pub fn pending_window(&self) -> Option<WindowRef> {
        self.read_state().pending.clone()
    }

    /// State of the stack entry (or cached instance) for `window`
    pub fn window_state(&self, window: &WindowRef) -> Option<WindowState> {
        let state = self.read_state();
        state
            .stack
            .iter()
            .chain(state.known.iter())
            .map(|key| &state.instances[*key])
            .find(|instance| instance.window == *window)
            .map(WindowInstance::state)
    }

    /// Scene currently loaded according to the loader
    pub fn current_scene(&self) -> Option<String> {
        match self.inner.services.try_borrow() {
            Ok(services) => services.scene_loader.current_scene().map(str::to_string),
            Err(_) => panic!(
                "WindowManager queried while {} is running",
                self.inner.running.get().unwrap_or_default()
            ),
        }
    }

    /// Whether a top-level operation is running
    pub fn is_busy(&self) -> bool {
        self.inner.running.get().is_some()
    }

    /// Forget every window, the pending show and all go-back handlers
    pub fn reset(&self) {
        let _guard = self.enter("reset");
        self.inner.go_back_handlers.borrow_mut().clear();
        let mut state = self.inner.state.borrow_mut();
        log::info!("Window manager reset, dropping {} instance(s)", state.instances.len());
        *state = NavState::default();
    }
}

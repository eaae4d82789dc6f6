//! Collaborators that produce and display window views

use super::window::WindowDef;

/// Displayable instance of a window
///
/// The stack only toggles visibility; it never looks inside a view.
/// `set_active` runs while a stack operation is in progress, so it must not
/// call back into the [`WindowManager`](super::WindowManager), not even its
/// read-only accessors; doing so panics.
pub trait WindowView {
    /// Show or hide the view
    fn set_active(&mut self, active: bool);

    /// Whether the view is currently shown
    fn is_active(&self) -> bool;
}

/// Produces views for window definitions
pub trait ViewFactory {
    /// Instantiate the prefab of `window`, or locate its scene object
    ///
    /// The returned view starts inactive.
    fn instantiate(&mut self, window: &WindowDef) -> Box<dyn WindowView>;
}

/// Host application services needed by the window stack
pub trait AppHost {
    /// Ask the application to quit
    fn request_exit(&mut self);
}

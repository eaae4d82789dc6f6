//! UI System Module
//!
//! Window definitions and the navigation stack that shows them.
//!
//! Architecture:
//! - WindowManager: LIFO window stack with scene-aware deferred shows
//! - window: Immutable window definitions and the catalog loading them
//! - view: Collaborator traits the stack drives (views, view factory, host)
//! - go_back: One-shot handlers intercepting back navigation

pub mod go_back;
pub mod manager;
pub mod view;
pub mod window;

#[cfg(test)]
mod tests;

pub use go_back::{GoBackAction, GoBackHandler, GoBackHandlers};
pub use manager::{WindowError, WindowManager, WindowState};
pub use view::{AppHost, ViewFactory, WindowView};
pub use window::{ViewSource, WindowCatalog, WindowDef, WindowRef, WindowSpec};

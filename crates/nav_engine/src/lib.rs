//! # Nav Engine
//!
//! UI runtime core for games: a typed message hub and a window navigation
//! stack.
//!
//! ## Features
//!
//! - **Message Hub**: Type-keyed publish/subscribe with owner liveness checks
//! - **Window Stack**: LIFO navigation with scene-bound windows and back handling
//! - **Configuration**: Window catalog and policies loaded from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nav_engine::prelude::*;
//!
//! struct NullView(bool);
//!
//! impl WindowView for NullView {
//!     fn set_active(&mut self, active: bool) {
//!         self.0 = active;
//!     }
//!
//!     fn is_active(&self) -> bool {
//!         self.0
//!     }
//! }
//!
//! struct NullFactory;
//!
//! impl ViewFactory for NullFactory {
//!     fn instantiate(&mut self, _window: &WindowDef) -> Box<dyn WindowView> {
//!         Box::new(NullView(false))
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::load_from_file("menu_app.toml")?;
//!     let mut ui = UiContext::new(&config, Box::new(NullFactory))?;
//!     ui.navigate(&NavigationCommand::Show("MainMenu".to_string()))?;
//!     while ui.is_running() {
//!         ui.update()?;
//!         ui.press_back(BackGesture::EscapeKey);
//!     }
//!     ui.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

pub mod events;
pub mod input;
pub mod scene;
pub mod ui;

mod context;

pub use context::{ContextError, ExitFlag, Navigated, NavigationCommand, UiContext};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        ContextError, Navigated, NavigationCommand, UiContext,
        config::Config,
        core::config::{ApplicationConfig, DuplicateTopPolicy, HubConfig, NavigationConfig, SceneConfig},
        events::{Handler, Hub, LifeToken, Message},
        input::{BackButton, BackGesture},
        scene::{BuildSceneLoader, SceneDescriptor, SceneError, SceneLoader},
        ui::{
            AppHost, GoBackAction, GoBackHandler, ViewFactory, ViewSource, WindowDef, WindowError,
            WindowManager, WindowRef, WindowView,
        },
    };
}

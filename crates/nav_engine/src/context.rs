//! UI context: owns the message hub, the window stack and its collaborators

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::{ApplicationConfig, ConfigError};
use crate::events::{Hub, Message};
use crate::input::{BackButton, BackGesture};
use crate::scene::{BuildSceneLoader, SceneLoader};
use crate::ui::{AppHost, ViewFactory, WindowCatalog, WindowError, WindowManager, WindowRef};

/// Context errors
#[derive(Error, Debug)]
pub enum ContextError {
    /// Configuration could not be used
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Navigation failed
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Window name missing from the catalog
    #[error("Unknown window: {0}")]
    UnknownWindow(String),
}

/// Navigation request addressed by window name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "window", rename_all = "snake_case")]
pub enum NavigationCommand {
    /// Show a window
    Show(String),
    /// Go back
    Back,
    /// Pop the current window without showing the next one
    Pop,
    /// Make the next go-back land on a window
    Unwind(String),
    /// Hide and clear the whole stack
    UnwindAll,
}

/// Published on the hub after every navigation command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigated {
    /// Command that ran
    pub command: NavigationCommand,
    /// Window on top afterwards
    pub current: Option<String>,
    /// Stack depth afterwards
    pub depth: usize,
}

impl Message for Navigated {}

/// Application host that records exit requests
#[derive(Debug, Clone, Default)]
pub struct ExitFlag(Rc<Cell<bool>>);

impl ExitFlag {
    /// Whether exit was requested
    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

impl AppHost for ExitFlag {
    fn request_exit(&mut self) {
        log::info!("Application exit requested");
        self.0.set(true);
    }
}

/// Owns one hub and one window stack
///
/// Replaces global singletons: create one per application and call
/// [`shutdown`](Self::shutdown) when done.
pub struct UiContext {
    hub: Arc<Hub>,
    windows: WindowManager,
    catalog: WindowCatalog,
    back_button: BackButton,
    exit: ExitFlag,
}

impl UiContext {
    /// Create a context with a [`BuildSceneLoader`] over the configured scenes
    pub fn new(config: &ApplicationConfig, view_factory: Box<dyn ViewFactory>) -> Result<Self, ContextError> {
        let loader = BuildSceneLoader::new(config.scenes.clone());
        Self::with_scene_loader(config, Box::new(loader), view_factory)
    }

    /// Create a context with a custom scene loader
    pub fn with_scene_loader(
        config: &ApplicationConfig,
        scene_loader: Box<dyn SceneLoader>,
        view_factory: Box<dyn ViewFactory>,
    ) -> Result<Self, ContextError> {
        log::info!("Initializing UI context...");
        config.validate()?;
        let catalog = WindowCatalog::from_specs(&config.windows)?;
        let exit = ExitFlag::default();
        let windows = WindowManager::new(
            config.navigation.clone(),
            scene_loader,
            view_factory,
            Box::new(exit.clone()),
        );
        let mut back_button = BackButton::new();
        windows.bind_back_button(&mut back_button);

        Ok(Self {
            hub: Arc::new(Hub::with_config(config.hub.clone())),
            windows,
            catalog,
            back_button,
            exit,
        })
    }

    /// Message hub, shareable across threads
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Window stack
    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    /// Window catalog
    pub fn catalog(&self) -> &WindowCatalog {
        &self.catalog
    }

    /// Look a window up by name
    pub fn window(&self, name: &str) -> Result<WindowRef, ContextError> {
        self.catalog
            .get(name)
            .ok_or_else(|| ContextError::UnknownWindow(name.to_string()))
    }

    /// Run a navigation command and publish [`Navigated`]
    pub fn navigate(&self, command: &NavigationCommand) -> Result<(), ContextError> {
        match command {
            NavigationCommand::Show(name) => self.windows.show_window(&self.window(name)?)?,
            NavigationCommand::Back => self.windows.go_back()?,
            NavigationCommand::Pop => self.windows.pop_current_window(),
            NavigationCommand::Unwind(name) => self.windows.unwind(Some(&self.window(name)?)),
            NavigationCommand::UnwindAll => self.windows.unwind(None),
        }
        self.announce(command.clone());
        Ok(())
    }

    /// Report a back gesture to the bound back button
    pub fn press_back(&mut self, gesture: BackGesture) {
        if self.back_button.signal(gesture) {
            self.announce(NavigationCommand::Back);
        }
    }

    /// Per-frame pump
    pub fn update(&self) -> Result<(), ContextError> {
        self.windows.update()?;
        Ok(())
    }

    /// Whether no exit was requested
    pub fn is_running(&self) -> bool {
        !self.exit.is_set()
    }

    /// Drop every window and subscription
    ///
    /// The context stays usable; the back button is bound again.
    pub fn shutdown(&mut self) {
        log::info!("UI context shutdown");
        self.windows.reset();
        self.hub.check_handler_count(true);
        self.hub.reset();
        self.back_button.clear_callback();
        self.windows.bind_back_button(&mut self.back_button);
    }

    fn announce(&self, command: NavigationCommand) {
        let current = self.windows.current_window().map(|w| w.name().to_string());
        self.hub.publish(Navigated {
            command,
            current,
            depth: self.windows.window_count(),
        });
    }
}

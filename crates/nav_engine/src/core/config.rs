//! # Unified Configuration System
//!
//! This module consolidates the configuration structures of the UI runtime into
//! a single, coherent system: message hub diagnostics, navigation behavior,
//! the scene list known to the loader, and the window catalog.
//!
//! ## Configuration Categories
//!
//! - **Hub Config**: Leak detection and dispatch tracing
//! - **Navigation Config**: Window stack policies
//! - **Scene Config**: Build scenes and network availability
//! - **Window Catalog**: Window definitions loaded once at startup

use serde::{Serialize, Deserialize};

// Re-export from the old config module for compatibility
pub use crate::config::{Config, ConfigError};
use crate::ui::{WindowCatalog, WindowSpec};

/// # Hub Configuration
///
/// Diagnostics for the message hub. Delivery semantics are not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Warn from `check_handler_count` when more subscriptions than this are registered
    pub leak_warning_threshold: Option<usize>,
    /// Log every publish with its delivery count at trace level
    pub trace_dispatch: bool,
}

impl HubConfig {
    /// Create a new hub configuration
    pub fn new() -> Self {
        Self {
            leak_warning_threshold: None,
            trace_dispatch: false,
        }
    }
    
    /// Set the leak warning threshold
    pub fn with_leak_warning_threshold(mut self, threshold: usize) -> Self {
        self.leak_warning_threshold = Some(threshold);
        self
    }
    
    /// Enable dispatch tracing
    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do when a window is shown on top of an entry for the same window
///
/// This only happens when the UI graph is wired wrong, for example two buttons
/// both opening the screen they live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTopPolicy {
    /// Pop the stale entry, log a warning and continue
    Heal,
    /// Refuse the request with [`WindowError::DuplicateTop`](crate::ui::WindowError::DuplicateTop)
    Reject,
}

/// # Navigation Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Handling of the "same window as previous top" misconfiguration
    pub duplicate_top: DuplicateTopPolicy,
    /// Request application exit when going back from the last window
    pub exit_on_last_back: bool,
}

impl NavigationConfig {
    /// Create a new navigation configuration
    pub fn new() -> Self {
        Self {
            duplicate_top: DuplicateTopPolicy::Heal,
            exit_on_last_back: true,
        }
    }
    
    /// Set the duplicate top policy
    pub fn with_duplicate_top(mut self, policy: DuplicateTopPolicy) -> Self {
        self.duplicate_top = policy;
        self
    }
    
    /// Configure exit behavior on the last back
    pub fn with_exit_on_last_back(mut self, enabled: bool) -> Self {
        self.exit_on_last_back = enabled;
        self
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Scene Configuration
///
/// Scenes the loader is allowed to load, in build order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Names of every loadable scene
    pub build_scenes: Vec<String>,
    /// Scene considered loaded at startup
    pub initial_scene: Option<String>,
    /// Whether a network subsystem is present for network scenes
    pub network_available: bool,
}

impl SceneConfig {
    /// Create a scene configuration from a list of build scenes
    ///
    /// The first scene becomes the initial scene.
    pub fn new<I, S>(build_scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let build_scenes: Vec<String> = build_scenes.into_iter().map(Into::into).collect();
        Self {
            initial_scene: build_scenes.first().cloned(),
            build_scenes,
            network_available: false,
        }
    }
    
    /// Enable or disable the network subsystem
    pub fn with_network(mut self, available: bool) -> Self {
        self.network_available = available;
        self
    }
    
    /// Check whether a scene is part of the build
    pub fn contains(&self, scene_name: &str) -> bool {
        self.build_scenes.iter().any(|s| s == scene_name)
    }
    
    /// Scene loaded at startup: `initial_scene`, or the first build scene
    pub fn initial(&self) -> Option<&str> {
        self.initial_scene
            .as_deref()
            .or_else(|| self.build_scenes.first().map(String::as_str))
    }

    /// Validate the scene list
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(initial) = &self.initial_scene {
            if !self.contains(initial) {
                return Err(ConfigError::Invalid(format!(
                    "Initial scene {initial} is not a build scene"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all UI runtime subsystems.
/// This is the main configuration structure applications should use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Message hub configuration
    pub hub: HubConfig,
    /// Window stack configuration
    pub navigation: NavigationConfig,
    /// Scene loader configuration
    pub scenes: SceneConfig,
    /// Window catalog
    pub windows: Vec<WindowSpec>,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    ///
    /// Every window must be well formed and every scene a window refers to
    /// must be a build scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scenes.validate()?;
        let catalog = WindowCatalog::from_specs(&self.windows)?;
        for window in catalog.iter() {
            if let Some(scene) = window.scene() {
                if !self.scenes.contains(&scene.scene_name) {
                    return Err(ConfigError::Invalid(format!(
                        "Window {} refers to unknown scene {}",
                        window.name(),
                        scene.scene_name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Config for ApplicationConfig {}

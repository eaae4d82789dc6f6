//! Scene loading collaborator
//!
//! The window stack never loads scenes itself. It asks a [`SceneLoader`]
//! whether a window needs a different scene, starts the load, and later gets
//! told which scene finished loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::SceneConfig;
use crate::ui::WindowDef;

/// Scene a window lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Scene name as known to the loader
    pub scene_name: String,
    /// Whether the scene is loaded through the network subsystem
    #[serde(default)]
    pub is_network_scene: bool,
}

impl SceneDescriptor {
    /// Describe a local scene
    pub fn new(scene_name: impl Into<String>) -> Self {
        Self {
            scene_name: scene_name.into(),
            is_network_scene: false,
        }
    }

    /// Describe a scene loaded through the network subsystem
    pub fn network(scene_name: impl Into<String>) -> Self {
        Self {
            scene_name: scene_name.into(),
            is_network_scene: true,
        }
    }
}

/// Scene loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Scene is not among the build scenes
    #[error("Scene not found in build scenes: {0}")]
    NotFound(String),

    /// Network scene requested without a network subsystem
    #[error("Network scene {0} requested but networking is not available")]
    NetworkUnavailable(String),

    /// Window has no scene to load
    #[error("Window {0} is not bound to a scene")]
    NoScene(String),
}

/// Scene loading collaborator used by the window stack
pub trait SceneLoader {
    /// Whether showing `window` requires loading a scene other than the current one
    fn needs_scene_load(&self, window: &WindowDef) -> bool;

    /// Start loading the scene of `window`
    ///
    /// Loading completes asynchronously; [`poll_loaded`](Self::poll_loaded)
    /// reports it. Starting a load for the current scene reloads it.
    fn load_scene(&mut self, window: &WindowDef) -> Result<(), SceneError>;

    /// Name of a scene that finished loading since the last poll
    fn poll_loaded(&mut self) -> Option<String>;

    /// Record that the host finished loading `scene_name`
    ///
    /// Called for every completed load, including ones already reported by
    /// [`poll_loaded`](Self::poll_loaded).
    fn scene_loaded(&mut self, scene_name: &str);

    /// Currently loaded scene
    fn current_scene(&self) -> Option<&str>;
}

/// Loader over a fixed list of build scenes
///
/// A started load completes on the next [`poll_loaded`](SceneLoader::poll_loaded),
/// which matches a host that finishes loads between frames.
#[derive(Debug, Clone)]
pub struct BuildSceneLoader {
    config: SceneConfig,
    current: Option<String>,
    loading: Option<String>,
    loads_started: usize,
}

impl BuildSceneLoader {
    /// Create a loader starting in the configured initial scene
    pub fn new(config: SceneConfig) -> Self {
        Self {
            current: config.initial().map(str::to_string),
            config,
            loading: None,
            loads_started: 0,
        }
    }

    /// Scene being loaded, if any
    pub fn loading_scene(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    /// Number of loads started so far
    pub fn loads_started(&self) -> usize {
        self.loads_started
    }
}

impl SceneLoader for BuildSceneLoader {
    fn needs_scene_load(&self, window: &WindowDef) -> bool {
        window
            .scene()
            .is_some_and(|scene| self.current.as_deref() != Some(scene.scene_name.as_str()))
    }

    fn load_scene(&mut self, window: &WindowDef) -> Result<(), SceneError> {
        let scene = window
            .scene()
            .ok_or_else(|| SceneError::NoScene(window.name().to_string()))?;
        if !self.config.contains(&scene.scene_name) {
            return Err(SceneError::NotFound(scene.scene_name.clone()));
        }
        if scene.is_network_scene && !self.config.network_available {
            return Err(SceneError::NetworkUnavailable(scene.scene_name.clone()));
        }
        if let Some(previous) = self.loading.replace(scene.scene_name.clone()) {
            log::debug!("Scene load of {previous} superseded by {}", scene.scene_name);
        }
        self.loads_started += 1;
        log::info!("Loading scene {} for window {}", scene.scene_name, window.name());
        Ok(())
    }

    fn poll_loaded(&mut self) -> Option<String> {
        let loaded = self.loading.take()?;
        log::info!("Scene {loaded} loaded");
        self.current = Some(loaded.clone());
        Some(loaded)
    }

    fn scene_loaded(&mut self, scene_name: &str) {
        if self.loading.as_deref() == Some(scene_name) {
            self.loading = None;
        }
        if self.current.as_deref() != Some(scene_name) {
            log::debug!("Scene {scene_name} reported loaded by the host");
            self.current = Some(scene_name.to_string());
        }
    }

    fn current_scene(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

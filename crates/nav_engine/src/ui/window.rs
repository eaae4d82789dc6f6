//! Window definitions and the window catalog
//!
//! Definitions are immutable and loaded once, so the stack compares them by
//! identity: two [`WindowRef`]s are equal only when they point at the same
//! definition.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::scene::SceneDescriptor;

/// Where the view of a window comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ViewSource {
    /// Prefab instantiated on demand
    Prefab(String),
    /// Object embedded in the window's scene; it only exists while the scene is loaded
    SceneObject(String),
}

impl ViewSource {
    /// Prefab view source
    pub fn prefab(name: impl Into<String>) -> Self {
        Self::Prefab(name.into())
    }

    /// Scene-embedded view source
    pub fn scene_object(name: impl Into<String>) -> Self {
        Self::SceneObject(name.into())
    }

    /// Asset or object name
    pub fn name(&self) -> &str {
        match self {
            Self::Prefab(name) | Self::SceneObject(name) => name,
        }
    }
}

/// Immutable description of a logical window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDef {
    name: String,
    source: ViewSource,
    is_pop_out: bool,
    scene: Option<SceneDescriptor>,
}

impl WindowDef {
    /// Describe a window that is not bound to a scene
    pub fn new(name: impl Into<String>, source: ViewSource) -> Self {
        Self {
            name: name.into(),
            source,
            is_pop_out: false,
            scene: None,
        }
    }

    /// Mark the window as pop-out
    pub fn with_pop_out(mut self, is_pop_out: bool) -> Self {
        self.is_pop_out = is_pop_out;
        self
    }

    /// Bind the window to a scene
    pub fn with_scene(mut self, scene: SceneDescriptor) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Window name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// View source
    pub fn source(&self) -> &ViewSource {
        &self.source
    }

    /// Whether showing another window removes this one instead of hiding it
    pub fn is_pop_out(&self) -> bool {
        self.is_pop_out
    }

    /// Scene the window lives in
    pub fn scene(&self) -> Option<&SceneDescriptor> {
        self.scene.as_ref()
    }

    /// Whether the view is owned by the window's scene
    pub fn is_scene_window(&self) -> bool {
        matches!(self.source, ViewSource::SceneObject(_))
    }
}

/// Shared handle to a window definition, compared by identity
#[derive(Clone)]
pub struct WindowRef(Arc<WindowDef>);

impl WindowRef {
    /// Share a definition
    pub fn new(def: WindowDef) -> Self {
        Self(Arc::new(def))
    }
}

impl From<WindowDef> for WindowRef {
    fn from(def: WindowDef) -> Self {
        Self::new(def)
    }
}

impl Deref for WindowRef {
    type Target = WindowDef;

    fn deref(&self) -> &WindowDef {
        &self.0
    }
}

impl PartialEq for WindowRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for WindowRef {}

impl fmt::Debug for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowRef({})", self.0.name)
    }
}

/// Serialized form of a window definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Unique window name
    pub name: String,
    /// View source
    pub source: ViewSource,
    /// Pop-out flag
    #[serde(default)]
    pub pop_out: bool,
    /// Owning scene
    #[serde(default)]
    pub scene: Option<SceneDescriptor>,
}

impl WindowSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("Window with empty name".to_string()));
        }
        if self.source.name().trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Window {} has an empty view source",
                self.name
            )));
        }
        if matches!(self.source, ViewSource::SceneObject(_)) && self.scene.is_none() {
            return Err(ConfigError::Invalid(format!(
                "Window {} uses a scene object but declares no scene",
                self.name
            )));
        }
        Ok(())
    }

    fn to_def(&self) -> WindowDef {
        let mut def = WindowDef::new(self.name.clone(), self.source.clone()).with_pop_out(self.pop_out);
        if let Some(scene) = &self.scene {
            def = def.with_scene(scene.clone());
        }
        def
    }
}

/// Window definitions loaded once at startup, looked up by name
#[derive(Debug, Clone, Default)]
pub struct WindowCatalog {
    windows: Vec<WindowRef>,
}

impl WindowCatalog {
    /// Build the catalog, rejecting malformed or duplicate windows
    pub fn from_specs(specs: &[WindowSpec]) -> Result<Self, ConfigError> {
        let mut catalog = Self::default();
        for spec in specs {
            spec.validate()?;
            catalog.insert(spec.to_def())?;
        }
        log::debug!("Window catalog loaded with {} window(s)", catalog.len());
        Ok(catalog)
    }

    /// Add a definition; names must be unique
    pub fn insert(&mut self, def: WindowDef) -> Result<WindowRef, ConfigError> {
        if self.get(def.name()).is_some() {
            return Err(ConfigError::Invalid(format!("Duplicate window {}", def.name())));
        }
        let window = WindowRef::new(def);
        self.windows.push(window.clone());
        Ok(window)
    }

    /// Look a window up by name
    pub fn get(&self, name: &str) -> Option<WindowRef> {
        self.windows.iter().find(|w| w.name() == name).cloned()
    }

    /// Windows in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &WindowRef> {
        self.windows.iter()
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

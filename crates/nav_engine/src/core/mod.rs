//! # Core Module
//!
//! Shared abstractions used by the hub and the window stack.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration system for all subsystems

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    Config,
    ConfigError,
    DuplicateTopPolicy,
    HubConfig,
    NavigationConfig,
    SceneConfig,
};

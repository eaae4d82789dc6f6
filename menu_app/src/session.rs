//! Session configuration: the application config plus a navigation script

use nav_engine::config::Config;
use nav_engine::core::config::{ApplicationConfig, SceneConfig};
use nav_engine::scene::SceneDescriptor;
use nav_engine::ui::{ViewSource, WindowSpec};
use nav_engine::NavigationCommand;
use serde::{Deserialize, Serialize};

/// Everything the demo reads from its config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hub, navigation, scenes and window catalog
    pub app: ApplicationConfig,
    /// Commands run one per frame
    pub script: Vec<NavigationCommand>,
    /// Frames spent pressing back after the script before giving up
    pub max_back_frames: u32,
}

impl Config for SessionConfig {}

fn window(name: &str, source: ViewSource, scene: Option<&str>) -> WindowSpec {
    WindowSpec {
        name: name.to_string(),
        source,
        pop_out: false,
        scene: scene.map(SceneDescriptor::new),
    }
}

fn show(name: &str) -> NavigationCommand {
    NavigationCommand::Show(name.to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        let mut confirm = window("Confirm", ViewSource::prefab("ConfirmPopup"), None);
        confirm.pop_out = true;

        let app = ApplicationConfig {
            scenes: SceneConfig::new(["Menu", "Battle"]),
            windows: vec![
                window("MainMenu", ViewSource::prefab("MainMenuPanel"), Some("Menu")),
                window("Settings", ViewSource::prefab("SettingsPanel"), None),
                confirm,
                window("Arena", ViewSource::scene_object("ArenaRoot"), Some("Battle")),
            ],
            ..ApplicationConfig::default()
        };

        Self {
            app,
            script: vec![
                show("MainMenu"),
                show("Settings"),
                show("Confirm"),
                show("Arena"),
                NavigationCommand::Unwind("MainMenu".to_string()),
                NavigationCommand::Back,
            ],
            max_back_frames: 16,
        }
    }
}

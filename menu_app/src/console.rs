//! Console views: every visibility change is logged

use nav_engine::ui::{ViewFactory, ViewSource, WindowDef, WindowView};

pub struct ConsoleView {
    label: String,
    active: bool,
}

impl WindowView for ConsoleView {
    fn set_active(&mut self, active: bool) {
        if self.active != active {
            log::info!("[{}] {}", self.label, if active { "shown" } else { "hidden" });
        }
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Default)]
pub struct ConsoleFactory {
    instantiated: usize,
}

impl ConsoleFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewFactory for ConsoleFactory {
    fn instantiate(&mut self, window: &WindowDef) -> Box<dyn WindowView> {
        self.instantiated += 1;
        let origin = match window.source() {
            ViewSource::Prefab(name) => format!("prefab {name}"),
            ViewSource::SceneObject(name) => format!("scene object {name}"),
        };
        log::info!("[{}] created from {origin} (view #{})", window.name(), self.instantiated);
        Box::new(ConsoleView {
            label: window.name().to_string(),
            active: false,
        })
    }
}

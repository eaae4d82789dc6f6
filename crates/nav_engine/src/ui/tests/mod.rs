//! Scenario tests for the window stack
//!
//! Views and the view factory record what happens to them in a shared event
//! log, so tests can check instantiation and visibility changes in order.

mod navigation;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{AppHost, ViewFactory, ViewSource, WindowDef, WindowManager, WindowRef, WindowView};
use crate::core::config::{NavigationConfig, SceneConfig};
use crate::foundation::logging;
use crate::scene::{BuildSceneLoader, SceneDescriptor};

type EventLog = Rc<RefCell<Vec<String>>>;

struct RecordingView {
    name: String,
    active: bool,
    log: EventLog,
}

impl WindowView for RecordingView {
    fn set_active(&mut self, active: bool) {
        if self.active != active {
            let verb = if active { "show" } else { "hide" };
            self.log.borrow_mut().push(format!("{verb} {}", self.name));
        }
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

struct RecordingFactory {
    log: EventLog,
}

impl ViewFactory for RecordingFactory {
    fn instantiate(&mut self, window: &WindowDef) -> Box<dyn WindowView> {
        self.log.borrow_mut().push(format!("new {}", window.name()));
        Box::new(RecordingView {
            name: window.name().to_string(),
            active: false,
            log: Rc::clone(&self.log),
        })
    }
}

struct ExitCounter(Rc<Cell<u32>>);

impl AppHost for ExitCounter {
    fn request_exit(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Window stack over the scenes Menu, Battle and Results, starting in Menu
struct Harness {
    manager: WindowManager,
    log: EventLog,
    exits: Rc<Cell<u32>>,
    main_menu: WindowRef,
    settings: WindowRef,
    profile: WindowRef,
    shop: WindowRef,
    confirm: WindowRef,
    battle_hud: WindowRef,
    arena: WindowRef,
    results: WindowRef,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(NavigationConfig::default())
    }

    fn with_config(config: NavigationConfig) -> Self {
        let log = EventLog::default();
        let factory = RecordingFactory { log: Rc::clone(&log) };
        Self::with_factory(config, Box::new(factory), log)
    }

    fn with_factory(config: NavigationConfig, factory: Box<dyn ViewFactory>, log: EventLog) -> Self {
        logging::init_for_tests();
        let exits = Rc::new(Cell::new(0));
        let loader = BuildSceneLoader::new(SceneConfig::new(["Menu", "Battle", "Results"]));
        let manager = WindowManager::new(
            config,
            Box::new(loader),
            factory,
            Box::new(ExitCounter(Rc::clone(&exits))),
        );
        Self {
            manager,
            log,
            exits,
            main_menu: WindowDef::new("MainMenu", ViewSource::prefab("MainMenuPanel"))
                .with_scene(SceneDescriptor::new("Menu"))
                .into(),
            settings: WindowDef::new("Settings", ViewSource::prefab("SettingsPanel")).into(),
            profile: WindowDef::new("Profile", ViewSource::prefab("ProfilePanel")).into(),
            shop: WindowDef::new("Shop", ViewSource::prefab("ShopPanel")).into(),
            confirm: WindowDef::new("Confirm", ViewSource::prefab("ConfirmPopup"))
                .with_pop_out(true)
                .into(),
            battle_hud: WindowDef::new("BattleHud", ViewSource::prefab("BattleHudPanel"))
                .with_scene(SceneDescriptor::new("Battle"))
                .into(),
            arena: WindowDef::new("Arena", ViewSource::scene_object("ArenaRoot"))
                .with_scene(SceneDescriptor::new("Battle"))
                .into(),
            results: WindowDef::new("Results", ViewSource::prefab("ResultsPanel"))
                .with_scene(SceneDescriptor::new("Results"))
                .into(),
        }
    }

    fn show(&self, window: &WindowRef) {
        self.manager.show_window(window).unwrap();
    }

    fn back(&self) {
        self.manager.go_back().unwrap();
    }

    fn stack(&self) -> Vec<String> {
        self.manager.stack_names()
    }

    fn events(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn clear_events(&self) {
        self.log.borrow_mut().clear();
    }

    fn count_events(&self, event: &str) -> usize {
        self.log.borrow().iter().filter(|e| *e == event).count()
    }
}

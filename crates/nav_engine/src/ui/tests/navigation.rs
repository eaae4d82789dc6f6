//! Stack navigation: show, go back, unwind, go-back handlers and re-entrancy

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::core::config::DuplicateTopPolicy;
use crate::input::{BackButton, BackGesture};
use crate::ui::{GoBackAction, GoBackHandler, WindowError, WindowState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_settings_round_trip_ends_in_exit() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        assert_eq!(h.stack(), ["Settings", "MainMenu"]);

        h.back();
        assert_eq!(h.stack(), ["MainMenu"]);
        assert_eq!(h.manager.current_window(), Some(h.main_menu.clone()));
        assert_eq!(h.manager.window_state(&h.main_menu), Some(WindowState::Visible));
        assert_eq!(h.manager.window_state(&h.settings), Some(WindowState::Hidden));
        assert_eq!(
            h.events(),
            [
                "new MainMenu",
                "show MainMenu",
                "hide MainMenu",
                "new Settings",
                "show Settings",
                "hide Settings",
                "show MainMenu",
            ]
        );

        h.back();
        assert_eq!(h.exits.get(), 1);
        assert_eq!(h.stack(), ["MainMenu"]);
    }

    #[test]
    fn test_back_from_last_window_without_exit() {
        let h = Harness::with_config(NavigationConfig {
            exit_on_last_back: false,
            ..NavigationConfig::default()
        });
        h.show(&h.main_menu);
        h.back();
        assert_eq!(h.exits.get(), 0);
        assert_eq!(h.stack(), ["MainMenu"]);

        h.manager.pop_current_window();
        h.back();
        assert_eq!(h.exits.get(), 0);
    }

    #[test]
    fn test_showing_visible_window_is_noop() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.clear_events();
        h.show(&h.main_menu);
        assert!(h.events().is_empty());
        assert_eq!(h.manager.window_count(), 1);
    }

    #[test]
    fn test_known_windows_are_reused() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        h.back();
        h.show(&h.settings);
        assert_eq!(h.count_events("new Settings"), 1);
        assert_eq!(h.manager.known_window_count(), 2);
    }

    #[test]
    fn test_pop_out_window_is_removed_by_next_show() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.confirm);
        assert_eq!(h.stack(), ["Confirm", "MainMenu"]);

        h.show(&h.settings);
        assert_eq!(h.stack(), ["Settings", "MainMenu"]);
        assert_eq!(h.manager.window_state(&h.confirm), Some(WindowState::Hidden));

        h.back();
        assert_eq!(h.stack(), ["MainMenu"]);
    }

    #[test]
    fn test_window_deeper_in_stack_is_collapsed() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        h.show(&h.main_menu);
        assert_eq!(h.stack(), ["MainMenu", "Settings"]);
        assert_eq!(h.count_events("new MainMenu"), 1);
        assert_eq!(h.manager.window_state(&h.main_menu), Some(WindowState::Visible));
    }

    #[test]
    fn test_pop_current_window_does_not_show_next() {
        let h = Harness::new();
        h.manager.pop_current_window();
        assert_eq!(h.manager.window_count(), 0);

        h.show(&h.main_menu);
        h.show(&h.settings);
        h.clear_events();
        h.manager.pop_current_window();
        assert_eq!(h.stack(), ["MainMenu"]);
        assert_eq!(h.events(), ["hide Settings"]);
    }

    #[test]
    fn test_unwind_to_window_on_stack() {
        let h = Harness::new();
        for window in [&h.main_menu, &h.settings, &h.profile, &h.shop] {
            h.show(window);
        }
        assert_eq!(h.stack(), ["Shop", "Profile", "Settings", "MainMenu"]);

        h.manager.unwind(Some(&h.settings));
        assert_eq!(h.stack(), ["Shop", "Settings", "MainMenu"]);
        assert_eq!(h.manager.current_window(), Some(h.shop.clone()));

        h.back();
        assert_eq!(h.stack(), ["Settings", "MainMenu"]);
        assert_eq!(h.manager.window_state(&h.settings), Some(WindowState::Visible));
        assert_eq!(h.manager.window_state(&h.profile), Some(WindowState::Hidden));
    }

    #[test]
    fn test_unwind_then_back_lands_on_target() {
        let h = Harness::new();
        let [a, b, c, d]: [WindowRef; 4] =
            ["A", "B", "C", "D"].map(|name| WindowDef::new(name, ViewSource::prefab(name)).into());
        for window in [&a, &b, &c, &d] {
            h.show(window);
        }
        assert_eq!(h.stack(), ["D", "C", "B", "A"]);

        h.manager.unwind(Some(&b));
        assert_eq!(h.stack(), ["D", "B", "A"]);
        assert_eq!(h.manager.current_window(), Some(d));

        h.back();
        assert_eq!(h.stack(), ["B", "A"]);
        assert_eq!(h.manager.window_state(&b), Some(WindowState::Visible));
        assert_eq!(h.count_events("new B"), 1);
    }

    #[test]
    fn test_unwind_to_current_window_is_noop() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        h.manager.unwind(Some(&h.settings));
        assert_eq!(h.stack(), ["Settings", "MainMenu"]);
    }

    #[test]
    fn test_unwind_on_empty_stack_is_noop() {
        let h = Harness::new();
        h.manager.unwind(Some(&h.settings));
        assert_eq!(h.manager.window_count(), 0);
    }

    #[test]
    fn test_unwind_to_missing_window_inserts_placeholder() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.shop);

        h.manager.unwind(Some(&h.settings));
        assert_eq!(h.stack(), ["Shop", "Settings"]);
        assert_eq!(h.manager.window_state(&h.settings), Some(WindowState::Uninstantiated));
        assert_eq!(h.count_events("new Settings"), 0);

        h.back();
        assert_eq!(h.stack(), ["Settings"]);
        assert_eq!(h.count_events("new Settings"), 1);
        assert_eq!(h.manager.window_state(&h.settings), Some(WindowState::Visible));
    }

    #[test]
    fn test_unwind_all_hides_everything() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        h.clear_events();

        h.manager.unwind(None);
        assert_eq!(h.manager.window_count(), 0);
        assert_eq!(h.manager.current_window(), None);
        assert_eq!(h.events(), ["hide Settings"]);
        assert_eq!(h.manager.window_state(&h.main_menu), Some(WindowState::Hidden));
    }

    fn placeholder_on_top(h: &Harness) {
        h.show(&h.main_menu);
        h.show(&h.shop);
        h.manager.unwind(Some(&h.settings));
        h.manager.pop_current_window();
        assert_eq!(h.stack(), ["Settings"]);
    }

    #[test]
    fn test_duplicate_top_is_healed_by_default() {
        let h = Harness::new();
        placeholder_on_top(&h);

        h.show(&h.settings);
        assert_eq!(h.stack(), ["Settings"]);
        assert_eq!(h.manager.window_state(&h.settings), Some(WindowState::Visible));
    }

    #[test]
    fn test_duplicate_top_can_be_rejected() {
        let h = Harness::with_config(NavigationConfig {
            duplicate_top: DuplicateTopPolicy::Reject,
            ..NavigationConfig::default()
        });
        placeholder_on_top(&h);

        let result = h.manager.show_window(&h.settings);
        assert!(matches!(result, Err(WindowError::DuplicateTop(name)) if name == "Settings"));
        assert_eq!(h.manager.window_state(&h.settings), Some(WindowState::Uninstantiated));
        assert!(!h.manager.is_busy());
    }

    #[test]
    fn test_go_back_handler_aborts_once() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let handler: GoBackHandler = Rc::new(move || {
            counter.set(counter.get() + 1);
            GoBackAction::Abort
        });
        assert!(h.manager.register_go_back_handler_once(Rc::clone(&handler)));
        assert!(!h.manager.register_go_back_handler_once(Rc::clone(&handler)));
        assert_eq!(h.manager.go_back_handler_count(), 1);

        h.back();
        assert_eq!(calls.get(), 1);
        assert_eq!(h.stack(), ["Settings", "MainMenu"]);
        assert_eq!(h.manager.go_back_handler_count(), 0);

        h.back();
        assert_eq!(calls.get(), 1);
        assert_eq!(h.stack(), ["MainMenu"]);
    }

    #[test]
    fn test_continuing_handler_lets_go_back_proceed() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        h.manager.register_go_back_handler_once(Rc::new(|| GoBackAction::Continue));

        h.back();
        assert_eq!(h.stack(), ["MainMenu"]);
    }

    #[test]
    fn test_handler_can_register_itself_again() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);

        let slot: Rc<RefCell<Option<GoBackHandler>>> = Rc::default();
        let calls = Rc::new(Cell::new(0));
        let handler: GoBackHandler = {
            let manager = h.manager.clone();
            let slot = Rc::clone(&slot);
            let calls = Rc::clone(&calls);
            Rc::new(move || {
                calls.set(calls.get() + 1);
                if let Some(me) = slot.borrow().as_ref() {
                    manager.register_go_back_handler_once(Rc::clone(me));
                }
                GoBackAction::Abort
            })
        };
        *slot.borrow_mut() = Some(Rc::clone(&handler));
        h.manager.register_go_back_handler_once(Rc::clone(&handler));

        h.back();
        h.back();
        assert_eq!(calls.get(), 2);
        assert_eq!(h.stack(), ["Settings", "MainMenu"]);
        assert_eq!(h.manager.go_back_handler_count(), 1);

        assert!(h.manager.unregister_go_back_handler_once(&handler));
        h.back();
        assert_eq!(h.stack(), ["MainMenu"]);
        slot.borrow_mut().take();
    }

    #[test]
    fn test_back_button_drives_go_back() {
        let h = Harness::new();
        let mut button = BackButton::new();
        h.manager.bind_back_button(&mut button);
        h.show(&h.main_menu);
        h.show(&h.settings);

        assert!(button.signal(BackGesture::EscapeKey));
        assert_eq!(h.stack(), ["MainMenu"]);
        assert!(button.signal(BackGesture::PlatformBack));
        assert_eq!(h.exits.get(), 1);
    }

    #[test]
    fn test_back_button_outlives_manager() {
        let mut button = BackButton::new();
        {
            let h = Harness::new();
            h.manager.bind_back_button(&mut button);
        }
        assert!(button.signal(BackGesture::EscapeKey));
    }

    #[test]
    fn test_reset_forgets_everything() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        h.manager.register_go_back_handler_once(Rc::new(|| GoBackAction::Abort));

        h.manager.reset();
        assert_eq!(h.manager.window_count(), 0);
        assert_eq!(h.manager.known_window_count(), 0);
        assert_eq!(h.manager.go_back_handler_count(), 0);

        h.show(&h.main_menu);
        assert_eq!(h.count_events("new MainMenu"), 2);
    }

    /// View that navigates to another window when shown
    struct ReentrantView {
        manager: Rc<RefCell<Option<WindowManager>>>,
        target: WindowRef,
    }

    impl WindowView for ReentrantView {
        fn set_active(&mut self, active: bool) {
            if active {
                if let Some(manager) = self.manager.borrow().as_ref() {
                    let _ = manager.show_window(&self.target);
                }
            }
        }

        fn is_active(&self) -> bool {
            false
        }
    }

    struct ReentrantFactory {
        manager: Rc<RefCell<Option<WindowManager>>>,
        target: WindowRef,
    }

    impl ViewFactory for ReentrantFactory {
        fn instantiate(&mut self, _window: &WindowDef) -> Box<dyn WindowView> {
            Box::new(ReentrantView {
                manager: Rc::clone(&self.manager),
                target: self.target.clone(),
            })
        }
    }

    #[test]
    #[should_panic(expected = "called while show_window is running")]
    fn test_view_calling_back_into_manager_panics() {
        let slot: Rc<RefCell<Option<WindowManager>>> = Rc::default();
        let target: WindowRef = WindowDef::new("Popup", ViewSource::prefab("PopupPanel")).into();
        let factory = ReentrantFactory {
            manager: Rc::clone(&slot),
            target,
        };
        let h = Harness::with_factory(NavigationConfig::default(), Box::new(factory), EventLog::default());
        *slot.borrow_mut() = Some(h.manager.clone());

        h.show(&h.settings);
    }

    #[test]
    #[should_panic(expected = "called while go_back is running")]
    fn test_handler_calling_back_into_manager_panics() {
        let h = Harness::new();
        h.show(&h.main_menu);
        let manager = h.manager.clone();
        let settings = h.settings.clone();
        h.manager.register_go_back_handler_once(Rc::new(move || {
            let _ = manager.show_window(&settings);
            GoBackAction::Continue
        }));

        h.back();
    }

    /// View that reads the stack depth when shown
    struct QueryingView {
        manager: Rc<RefCell<Option<WindowManager>>>,
    }

    impl WindowView for QueryingView {
        fn set_active(&mut self, active: bool) {
            if active {
                if let Some(manager) = self.manager.borrow().as_ref() {
                    let _ = manager.window_count();
                }
            }
        }

        fn is_active(&self) -> bool {
            false
        }
    }

    struct QueryingFactory {
        manager: Rc<RefCell<Option<WindowManager>>>,
    }

    impl ViewFactory for QueryingFactory {
        fn instantiate(&mut self, _window: &WindowDef) -> Box<dyn WindowView> {
            Box::new(QueryingView {
                manager: Rc::clone(&self.manager),
            })
        }
    }

    #[test]
    #[should_panic(expected = "WindowManager queried while show_window is running")]
    fn test_view_querying_manager_panics() {
        let slot: Rc<RefCell<Option<WindowManager>>> = Rc::default();
        let factory = QueryingFactory {
            manager: Rc::clone(&slot),
        };
        let h = Harness::with_factory(NavigationConfig::default(), Box::new(factory), EventLog::default());
        *slot.borrow_mut() = Some(h.manager.clone());

        h.show(&h.settings);
    }

    #[test]
    fn test_handler_may_query_manager() {
        let h = Harness::new();
        h.show(&h.main_menu);
        h.show(&h.settings);
        let manager = h.manager.clone();
        let depth = Rc::new(Cell::new(0));
        let seen = Rc::clone(&depth);
        h.manager.register_go_back_handler_once(Rc::new(move || {
            seen.set(manager.window_count());
            GoBackAction::Continue
        }));

        h.back();
        assert_eq!(depth.get(), 2);
        assert_eq!(h.stack(), ["MainMenu"]);
    }
}

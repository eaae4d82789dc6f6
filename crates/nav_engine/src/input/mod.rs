//! Back/escape signal source
//!
//! The host maps its own input (escape key, platform back button) onto
//! [`BackButton::signal`]; the window stack installs the callback with
//! [`WindowManager::bind_back_button`](crate::ui::WindowManager::bind_back_button).

/// Gestures that mean "go back"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackGesture {
    /// Escape key on desktop
    EscapeKey,
    /// Platform back button (Android)
    PlatformBack,
}

/// Callback fired on a back gesture
pub type BackCallback = Box<dyn FnMut()>;

/// Holds the single go-back callback and fires it on back gestures
#[derive(Default)]
pub struct BackButton {
    callback: Option<BackCallback>,
    signals: u64,
}

impl BackButton {
    /// Create a back button without a callback
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the callback, replacing any previous one
    pub fn set_callback(&mut self, callback: impl FnMut() + 'static) {
        if self.callback.is_some() {
            log::debug!("Replacing back button callback");
        }
        self.callback = Some(Box::new(callback));
    }

    /// Remove the callback
    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// Whether a callback is installed
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Report a back gesture; returns whether a callback ran
    pub fn signal(&mut self, gesture: BackGesture) -> bool {
        self.signals += 1;
        log::debug!("Back gesture {gesture:?}");
        match self.callback.as_mut() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Number of gestures reported so far
    pub fn signal_count(&self) -> u64 {
        self.signals
    }
}

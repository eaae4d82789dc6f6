//! Menu demo application
//!
//! Runs a scripted navigation session through the window stack with console
//! views. The window catalog and the script come from `menu_app.toml` (or the
//! path given as first argument); built-in defaults are used when the file is
//! missing.

mod console;
mod session;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nav_engine::config::{Config, ConfigError};
use nav_engine::events::LifeToken;
use nav_engine::foundation::logging;
use nav_engine::input::BackGesture;
use nav_engine::{ContextError, Navigated, UiContext};
use thiserror::Error;

use console::ConsoleFactory;
use session::SessionConfig;

const DEFAULT_CONFIG: &str = "menu_app.toml";

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Application still running after {0} back presses")]
    NoExit(u32),
}

fn run(session: &SessionConfig) -> Result<(), AppError> {
    let mut ui = UiContext::new(&session.app, Box::new(ConsoleFactory::new()))?;

    let listener = LifeToken::new();
    let announcements = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&announcements);
    ui.hub().subscribe::<Navigated>(
        &listener,
        Arc::new(move |m: &Navigated| {
            counter.fetch_add(1, Ordering::Relaxed);
            log::info!(
                "{:?} -> {} (depth {})",
                m.command,
                m.current.as_deref().unwrap_or("<none>"),
                m.depth
            );
        }),
    );

    for command in &session.script {
        ui.navigate(command)?;
        ui.update()?;
    }

    let mut frames = 0;
    while ui.is_running() {
        if frames == session.max_back_frames {
            return Err(AppError::NoExit(frames));
        }
        ui.press_back(BackGesture::EscapeKey);
        ui.update()?;
        frames += 1;
    }

    log::info!(
        "Session finished after {} navigation(s), {} back press(es)",
        announcements.load(Ordering::Relaxed),
        frames
    );
    listener.destroy();
    ui.shutdown();
    Ok(())
}

fn main() {
    logging::init("info");

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let result = SessionConfig::load_or_default(&path)
        .map_err(AppError::from)
        .and_then(|session| run(&session));

    if let Err(e) = result {
        log::error!("Application error: {e}");
        std::process::exit(1);
    }
}

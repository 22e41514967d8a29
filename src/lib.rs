pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod logging;
pub mod presentation;
pub mod registry;
pub mod state;
pub mod storage;
pub mod system;
pub use command::Command;
pub use controller::ThemeController;
pub use error::{AppError, AppResult};

/// Entrypoint used by the CLI binary: opens the user's theme state and runs `command`.
pub fn run(command: Command) -> AppResult<String> {
    logging::init();
    tracing::info!(?command, "starting themekeeper");

    let app_config = config::AppConfig::load();
    let mut controller = ThemeController::from_app_config(&app_config)?;
    let report = command.execute(&mut controller)?;
    controller.dispose();

    tracing::info!(current = %controller.current(), "theme command complete");
    Ok(report)
}

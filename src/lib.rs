pub mod core;
pub mod plugins;
pub mod shared;

use crate::core::logging::{init_logging, LoggingError, LoggingGuards};
use crate::core::settings::load_settings;
use plugins::board::api::HttpBoardApi;
use plugins::board::commands::BoardController;
use plugins::board::errors::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error("Failed to build the task API client: {0}")]
    Api(#[from] ApiError),
}

/// A running board session. Keep it alive for as long as logs should be flushed.
pub struct App {
    pub controller: BoardController<HttpBoardApi>,
    _logging: LoggingGuards,
}

/// Loads settings, starts logging and builds the board controller.
pub fn run() -> Result<App, StartupError> {
    // Logging first, so settings problems end up in the log
    let logging = init_logging()?;

    let settings = load_settings();
    let controller = plugins::board::init_board_controller(&settings)?;

    Ok(App {
        controller,
        _logging: logging,
    })
}

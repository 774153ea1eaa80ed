pub mod api;
pub mod commands;
pub mod drag;
pub mod errors;
pub mod form;
pub mod helpers;
pub mod notice;
pub mod reducer;
pub mod types;

use crate::core::settings::AppSettings;
use api::HttpBoardApi;
use commands::BoardController;
use errors::ApiError;

/// Builds a controller talking to the configured task API. The board starts
/// empty; call [`BoardController::load`] to fetch it.
pub fn init_board_controller(
    settings: &AppSettings,
) -> Result<BoardController<HttpBoardApi>, ApiError> {
    let api = HttpBoardApi::from_settings(settings)?;
    tracing::info!(
        target: "board",
        "Board controller initialized against {} (rollback on failure: {})",
        api.base_url(),
        settings.rollback_on_failure
    );
    Ok(BoardController::new(api, settings))
}

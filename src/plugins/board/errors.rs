use super::types::{TaskId, TaskStatus};
use thiserror::Error;

/// Local form validation, raised before any state change or request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
}

/// A status string outside `todo`, `inprogress` and `done`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown task status: {status:?}")]
pub struct UnknownStatusError {
    pub status: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date: {0:?}")]
pub struct InvalidDateError(pub String);

/// Errors from the task API, classified by how the request failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Task {0} was not found")]
    NotFound(TaskId),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Task {id} cannot be placed on the board: {source}")]
    UnknownStatus {
        id: TaskId,
        source: UnknownStatusError,
    },
}

impl ApiError {
    /// Maps a non-success HTTP status to an error. `id` names the task the request targeted.
    pub fn from_status(status: u16, id: Option<TaskId>, message: impl Into<String>) -> Self {
        match (status, id) {
            (404, Some(id)) => ApiError::NotFound(id),
            _ => ApiError::Status {
                status,
                message: message.into(),
            },
        }
    }

    /// The task this error shows has left the board: deleted on the server, or
    /// moved to a status the board has no column for.
    pub fn stale_task(&self) -> Option<TaskId> {
        match self {
            ApiError::NotFound(id) | ApiError::UnknownStatus { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Reducer rejections. The board is returned unchanged alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Index {index} is out of range for the {status} column of length {len}")]
    IndexOutOfRange {
        status: TaskStatus,
        index: usize,
        len: usize,
    },
    #[error("Task {0} appears more than once")]
    DuplicateTask(TaskId),
}

/// Top-level error type for board operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatusError),
    #[error(transparent)]
    Rejected(#[from] Diagnostic),
    #[error("Task {0} is not on the board")]
    MissingTask(TaskId),
    #[error("No delete is awaiting confirmation")]
    NothingToConfirm,
}

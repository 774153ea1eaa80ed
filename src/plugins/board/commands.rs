use super::api::BoardApi;
use super::drag::{intent_for_drag, DragEnd};
use super::errors::{ApiError, BoardError, Diagnostic};
use super::form::TaskForm;
use super::helpers::{format_due_date, resolve_categories};
use super::notice::{Notice, NoticeLevel};
use super::reducer::{Board, Compensation, Intent};
use super::types::{Category, Task, TaskId, TaskPatch};
use crate::core::settings::AppSettings;

/// Coordinates user actions, reducer transitions and API calls for one board session.
///
/// Every handler takes `&mut self`, so transitions are applied one at a time.
/// Failures are logged and queued as notices, and also returned to the caller.
pub struct BoardController<A: BoardApi> {
    api: A,
    board: Board,
    categories: Vec<Category>,
    notices: Vec<Notice>,
    pending_delete: Option<TaskId>,
    notice_duration_ms: u64,
    rollback_on_failure: bool,
}

impl<A: BoardApi> BoardController<A> {
    pub fn new(api: A, settings: &AppSettings) -> Self {
        Self {
            api,
            board: Board::new(),
            categories: Vec::new(),
            notices: Vec::new(),
            pending_delete: None,
            notice_duration_ms: settings.notice_duration_ms,
            rollback_on_failure: settings.rollback_on_failure,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Categories ticked in `form`, for rendering its badges.
    pub fn selected_categories(&self, form: &TaskForm) -> Vec<Category> {
        resolve_categories(&self.categories, &form.category_ids)
    }

    pub fn pending_delete(&self) -> Option<TaskId> {
        self.pending_delete
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, title: &str, description: impl Into<String>) {
        self.notices.push(Notice::new(
            level,
            title,
            description,
            self.notice_duration_ms,
        ));
    }

    fn dispatch(&mut self, intent: Intent) -> Result<(), Diagnostic> {
        let transition = self.board.apply(intent);
        self.board = transition.board;

        match transition.diagnostic {
            Some(diagnostic) => {
                tracing::warn!(target: "board", "Intent rejected: {}", diagnostic);
                Err(diagnostic)
            }
            None => Ok(()),
        }
    }

    /// Upserts a server response, keeping local categories when the response omits them.
    fn reconcile(&mut self, mut task: Task) -> Task {
        if task.categories.is_empty() {
            if let Some(local) = self.board.get(task.id) {
                task.categories = local.categories.clone();
            }
        }
        let _ = self.dispatch(Intent::Upsert(task.clone()));
        task
    }

    fn fail(&mut self, title: &str, error: ApiError, compensation: Option<Compensation>) -> BoardError {
        tracing::error!(target: "board", "{}: {}", title, error);

        if let Some(id) = error.stale_task() {
            // Gone from the server's board; drop it rather than restore it.
            let _ = self.dispatch(Intent::Remove(id));
        } else if let Some(compensation) = compensation.filter(|_| self.rollback_on_failure) {
            tracing::info!(target: "board", "Reverting optimistic change: {:?}", compensation);
            self.board = self.board.revert(&compensation);
        }

        self.notify(NoticeLevel::Error, title, error.to_string());
        match error {
            ApiError::UnknownStatus { source, .. } => BoardError::UnknownStatus(source),
            error => BoardError::Api(error),
        }
    }

    /// Fetches every task and the category list, replacing the board wholesale.
    pub async fn load(&mut self) -> Result<(), BoardError> {
        let tasks = match self.api.list_tasks(None).await {
            Ok(tasks) => tasks,
            Err(e) => return Err(self.fail("Could not load tasks", e, None)),
        };

        let count = tasks.len();
        if let Err(diagnostic) = self.dispatch(Intent::Load(tasks)) {
            self.notify(NoticeLevel::Info, "Some tasks were skipped", diagnostic.to_string());
        }
        tracing::info!(target: "board", "Board loaded with {} tasks", count);

        match self.api.list_categories().await {
            Ok(categories) => {
                self.categories = categories;
                Ok(())
            }
            Err(e) => Err(self.fail("Could not load categories", e, None)),
        }
    }

    /// Refreshes one task from the server, dropping it if the server no longer has it.
    pub async fn reload_task(&mut self, id: TaskId) -> Result<Task, BoardError> {
        match self.api.get_task(id).await {
            Ok(task) => Ok(self.reconcile(task)),
            Err(e) => Err(self.fail("Could not refresh task", e, None)),
        }
    }

    /// Applies a drag-end event. Reorders stay local; a move to another column is
    /// applied first and then sent to the server as a status update.
    pub async fn drag_end(&mut self, event: &DragEnd) -> Result<(), BoardError> {
        let Some(intent) = intent_for_drag(event) else {
            return Ok(());
        };

        let Intent::MoveAcrossColumn {
            from_status,
            from_index,
            to_status,
            ..
        } = intent
        else {
            return self.dispatch(intent).map_err(BoardError::from);
        };

        let Some(id) = self.board.column(from_status).get(from_index).map(|t| t.id) else {
            return self.dispatch(intent).map_err(BoardError::from);
        };

        let compensation = self.board.compensation_for(&intent);
        self.dispatch(intent)?;
        tracing::debug!(target: "board", task_id = id, from = %from_status, to = %to_status, "Moved task");

        match self.api.update_task(id, &TaskPatch::status(to_status)).await {
            Ok(task) => {
                self.reconcile(task);
                self.notify(
                    NoticeLevel::Success,
                    "Status updated",
                    format!("Moved to {}", to_status.label()),
                );
                Ok(())
            }
            Err(e) => Err(self.fail("Could not update status", e, compensation)),
        }
    }

    /// Saves the form: creates a task when it has no id, updates it otherwise.
    /// An empty title is rejected before anything changes.
    pub async fn submit_form(&mut self, form: &TaskForm) -> Result<Task, BoardError> {
        if let Err(e) = form.validate() {
            self.notify(NoticeLevel::Error, "Title is required", e.to_string());
            return Err(e.into());
        }

        match form.id {
            None => self.create(form).await,
            Some(id) => self.update(id, form).await,
        }
    }

    async fn create(&mut self, form: &TaskForm) -> Result<Task, BoardError> {
        match self.api.create_task(&form.to_draft()).await {
            Ok(task) => {
                let _ = self.dispatch(Intent::Upsert(task.clone()));
                self.notify(
                    NoticeLevel::Success,
                    "Task created",
                    format!("{} (due {})", task.title, format_due_date(task.due_date)),
                );
                Ok(task)
            }
            Err(e) => Err(self.fail("Could not create task", e, None)),
        }
    }

    async fn update(&mut self, id: TaskId, form: &TaskForm) -> Result<Task, BoardError> {
        let mut compensation = None;
        if let Some(current) = self.board.get(id) {
            let intent = Intent::Upsert(form.apply_to(current));
            compensation = self.board.compensation_for(&intent);
            self.dispatch(intent)?;
        }

        match self.api.update_task(id, &form.to_patch()).await {
            Ok(task) => {
                let task = self.reconcile(task);
                self.notify(NoticeLevel::Success, "Task updated", task.title.clone());
                Ok(task)
            }
            Err(e) => Err(self.fail("Could not update task", e, compensation)),
        }
    }

    /// Marks a task for deletion. Nothing is removed until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, id: TaskId) -> Result<(), BoardError> {
        if !self.board.contains(id) {
            return Err(BoardError::MissingTask(id));
        }
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> Result<(), BoardError> {
        let id = self.pending_delete.take().ok_or(BoardError::NothingToConfirm)?;

        let intent = Intent::Remove(id);
        let compensation = self.board.compensation_for(&intent);
        self.dispatch(intent)?;

        match self.api.delete_task(id).await {
            Ok(()) => {
                self.notify(NoticeLevel::Success, "Task deleted", format!("Task {} removed", id));
                Ok(())
            }
            Err(e) => Err(self.fail("Could not delete task", e, compensation)),
        }
    }
}

use super::errors::ValidationError;
use super::types::{CategoryId, Task, TaskDraft, TaskId, TaskPatch, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// State of the create/edit form. `id` is set only when editing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    #[serde(default)]
    pub id: Option<TaskId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl TaskForm {
    pub fn new(today: NaiveDate) -> Self {
        Self::for_status(TaskStatus::Todo, today)
    }

    /// Blank form opened from a column's add button.
    pub fn for_status(status: TaskStatus, today: NaiveDate) -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            due_date: today,
            status,
            category_ids: Vec::new(),
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date,
            status: task.status,
            category_ids: task.category_ids(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn toggle_category(&mut self, id: CategoryId) {
        if let Some(pos) = self.category_ids.iter().position(|c| *c == id) {
            self.category_ids.remove(pos);
        } else {
            self.category_ids.push(id);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    fn description(&self) -> Option<String> {
        let description = self.description.trim();
        (!description.is_empty()).then(|| description.to_string())
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description(),
            due_date: self.due_date,
            status: self.status,
            category_ids: self.category_ids.clone(),
        }
    }

    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            due_date: Some(self.due_date),
            status: Some(self.status),
        }
    }

    /// The task as it will look once the edit is saved. Categories are not
    /// edited through the update endpoint, so the task keeps its own.
    pub fn apply_to(&self, task: &Task) -> Task {
        Task {
            title: self.title.trim().to_string(),
            description: self.description(),
            due_date: self.due_date,
            status: self.status,
            ..task.clone()
        }
    }
}

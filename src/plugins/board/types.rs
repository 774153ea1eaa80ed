use super::errors::UnknownStatusError;
use super::helpers::deserialize_due_date;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskId = i64;
pub type CategoryId = i64;

/// The three board columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Position of this status's column on the board.
    pub fn index(self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }

    /// Wire form, also used as the drop-zone id of the column.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatusError {
                status: s.to_string(),
            })
    }
}

fn default_valid() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(alias = "color")]
    pub color_tag: String,
    pub slug: String,
    #[serde(default = "default_valid")]
    pub is_valid: bool,
}

/// A persisted task. Deserializes through [`RawTask`], so an unknown status is a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTask")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Task as it arrives from the server, before its status is checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "completionDate", deserialize_with = "deserialize_due_date")]
    pub due_date: NaiveDate,
    pub status: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawTask> for Task {
    type Error = UnknownStatusError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let status = raw.status.parse()?;
        Ok(Task {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            due_date: raw.due_date,
            status,
            categories: raw.categories,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

impl Task {
    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// Splits server records into tasks and the statuses that could not be placed on the board.
pub fn decode_tasks(raw: Vec<RawTask>) -> (Vec<Task>, Vec<UnknownStatusError>) {
    let mut tasks = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for record in raw {
        let id = record.id;
        match Task::try_from(record) {
            Ok(task) => tasks.push(task),
            Err(e) => {
                tracing::warn!(target: "api", task_id = id, "Excluding task from board: {}", e);
                rejected.push(e);
            }
        }
    }

    (tasks, rejected)
}

/// Body of `POST /tasks`: a task that has no id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub category_ids: Vec<CategoryId>,
}

/// Body of `PUT /tasks/{id}`. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle state of a task.
///
/// Any state may be replaced by any other on update; there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    /// Name used both on the wire and in the `tasks.status` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseTaskStatusError(s.to_string()))
    }
}

/// Current wall-clock time (UTC) at the millisecond precision used on the wire.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(3)
}

/// Mutable fields of a task, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDateTime>,
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    due_date: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Task {
    /// Creates a fresh `TODO` task with a new identifier.
    pub fn new(
        title: String,
        description: Option<String>,
        due_date: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status: TaskStatus::Todo,
            due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a task from stored columns.
    pub fn restore(
        id: Uuid,
        title: String,
        description: Option<String>,
        status: TaskStatus,
        due_date: Option<NaiveDateTime>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            title,
            description,
            status,
            due_date,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<NaiveDateTime> {
        self.due_date
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Overwrites every mutable field and refreshes `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges, now: NaiveDateTime) {
        self.title = changes.title;
        self.description = changes.description;
        self.status = changes.status;
        self.due_date = changes.due_date;
        self.touch(now);
    }

    // updated_at must move forward even when two writes share a millisecond
    fn touch(&mut self, now: NaiveDateTime) {
        let floor = self.updated_at + Duration::milliseconds(1);
        self.updated_at = now.max(floor);
    }
}

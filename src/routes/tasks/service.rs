//! Task business rules: creation defaults, wholesale update, existence checks.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::dto::{TaskRequest, TaskResponse};
use super::model::{self, Task, TaskChanges, TaskStatus};
use super::repository::{RepositoryError, TaskRepository};

#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    #[error("task not found with id: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

fn required_title(input: &TaskRequest) -> TaskServiceResult<String> {
    match input.title.as_deref() {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(TaskServiceError::InvalidArgument {
            field: "title",
            message: "Title is required".to_string(),
        }),
    }
}

fn required_status(input: &TaskRequest) -> TaskServiceResult<TaskStatus> {
    input.status.ok_or_else(|| TaskServiceError::InvalidArgument {
        field: "status",
        message: "Status is required".to_string(),
    })
}

#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Creates a `TODO` task. Any status, id or timestamps in `input` are ignored.
    pub async fn create_task(&self, input: TaskRequest) -> TaskServiceResult<TaskResponse> {
        let title = required_title(&input)?;
        let task = Task::new(title, input.description, input.due_date, model::now());

        let saved = self.repository.save(&task).await?;
        tracing::info!(task_id = %saved.id(), "task created");

        Ok(saved.into())
    }

    /// Absent tasks are `Ok(None)`, not an error.
    pub async fn get_task(&self, id: Uuid) -> TaskServiceResult<Option<TaskResponse>> {
        let task = self.repository.find_by_id(id).await?;
        Ok(task.map(TaskResponse::from))
    }

    pub async fn get_all_tasks(&self) -> TaskServiceResult<Vec<TaskResponse>> {
        let tasks = self.repository.find_all().await?;
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    pub async fn get_tasks_by_status(
        &self,
        status: TaskStatus,
    ) -> TaskServiceResult<Vec<TaskResponse>> {
        let tasks = self.repository.find_by_status(status).await?;
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    /// Replaces title, description, status and due date of an existing task.
    ///
    /// Fields missing from `input` are not kept from the stored record: an
    /// absent description or due date clears it.
    pub async fn update_task(
        &self,
        id: Uuid,
        input: TaskRequest,
    ) -> TaskServiceResult<TaskResponse> {
        let mut task = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;

        let changes = TaskChanges {
            title: required_title(&input)?,
            status: required_status(&input)?,
            description: input.description,
            due_date: input.due_date,
        };
        task.apply(changes, model::now());

        // a delete may land between the read and this write
        let saved = self
            .repository
            .update(&task)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;
        tracing::info!(task_id = %id, status = %saved.status(), "task updated");

        Ok(saved.into())
    }

    /// Idempotent: deleting an unknown id succeeds.
    pub async fn delete_task(&self, id: Uuid) -> TaskServiceResult<()> {
        self.repository.delete_by_id(id).await?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }
}

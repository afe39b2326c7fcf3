//! Persistence contract for tasks and the in-memory backend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use super::model::{Task, TaskStatus};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped back to a `Task`.
    #[error("corrupt task row: {0}")]
    CorruptRow(String),

    #[error("storage lock poisoned: {0}")]
    Poisoned(String),
}

/// Keyed task storage.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>>;

    /// Every stored task, in storage-defined order.
    async fn find_all(&self) -> RepositoryResult<Vec<Task>>;

    async fn find_by_status(&self, status: TaskStatus) -> RepositoryResult<Vec<Task>>;

    /// Tasks whose due date is strictly before `cutoff`. Tasks without a due
    /// date never match.
    async fn find_by_due_date_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<Vec<Task>>;

    /// Inserts the task if its id is unseen, otherwise overwrites it.
    /// `created_at` of an existing record is never rewritten.
    async fn save(&self, task: &Task) -> RepositoryResult<Task>;

    /// Overwrites a stored task in one step and never inserts. `None` when the
    /// id is not stored (e.g. deleted since it was read).
    async fn update(&self, task: &Task) -> RepositoryResult<Option<Task>>;

    /// No-op when the id does not exist.
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;

    async fn exists_by_id(&self, id: Uuid) -> RepositoryResult<bool>;
}

/// Thread-safe in-memory task storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, keep: impl Fn(&Task) -> bool) -> RepositoryResult<Vec<Task>> {
        let tasks = self
            .tasks
            .read()
            .map_err(|err| RepositoryError::Poisoned(err.to_string()))?;
        Ok(tasks.values().filter(|task| keep(task)).cloned().collect())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        let tasks = self
            .tasks
            .read()
            .map_err(|err| RepositoryError::Poisoned(err.to_string()))?;
        Ok(tasks.get(&id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Task>> {
        self.filtered(|_| true)
    }

    async fn find_by_status(&self, status: TaskStatus) -> RepositoryResult<Vec<Task>> {
        self.filtered(|task| task.status() == status)
    }

    async fn find_by_due_date_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<Vec<Task>> {
        self.filtered(|task| task.due_date().is_some_and(|due| due < cutoff))
    }

    async fn save(&self, task: &Task) -> RepositoryResult<Task> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|err| RepositoryError::Poisoned(err.to_string()))?;

        let stored = match tasks.get(&task.id()) {
            Some(existing) => Task::restore(
                task.id(),
                task.title().to_string(),
                task.description().map(str::to_string),
                task.status(),
                task.due_date(),
                existing.created_at(),
                task.updated_at(),
            ),
            None => task.clone(),
        };
        tasks.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Option<Task>> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|err| RepositoryError::Poisoned(err.to_string()))?;

        let Some(existing) = tasks.get_mut(&task.id()) else {
            return Ok(None);
        };
        *existing = Task::restore(
            task.id(),
            task.title().to_string(),
            task.description().map(str::to_string),
            task.status(),
            task.due_date(),
            existing.created_at(),
            task.updated_at(),
        );
        Ok(Some(existing.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|err| RepositoryError::Poisoned(err.to_string()))?;
        tasks.remove(&id);
        Ok(())
    }

    async fn exists_by_id(&self, id: Uuid) -> RepositoryResult<bool> {
        let tasks = self
            .tasks
            .read()
            .map_err(|err| RepositoryError::Poisoned(err.to_string()))?;
        Ok(tasks.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tasks::model::TaskChanges;
    use chrono::{Duration, NaiveDate};
    use rstest::{fixture, rstest};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn task_due(title: &str, due: Option<NaiveDateTime>) -> Task {
        Task::new(title.to_string(), None, due, noon())
    }

    #[fixture]
    fn repository() -> InMemoryTaskRepository {
        InMemoryTaskRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn save_then_find_by_id(repository: InMemoryTaskRepository) {
        let task = task_due("Write report", None);

        let saved = repository.save(&task).await.unwrap();

        assert_eq!(saved, task);
        assert_eq!(repository.find_by_id(task.id()).await.unwrap(), Some(task));
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_id_absent_is_none(repository: InMemoryTaskRepository) {
        assert_eq!(repository.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn save_overwrites_but_keeps_created_at(repository: InMemoryTaskRepository) {
        let original = task_due("Original", None);
        repository.save(&original).await.unwrap();

        // same id, different creation time
        let imposter = Task::restore(
            original.id(),
            "Changed".into(),
            None,
            TaskStatus::Completed,
            None,
            noon() + Duration::days(1),
            noon() + Duration::days(1),
        );
        let saved = repository.save(&imposter).await.unwrap();

        assert_eq!(saved.title(), "Changed");
        assert_eq!(saved.status(), TaskStatus::Completed);
        assert_eq!(saved.created_at(), original.created_at());
        assert_eq!(repository.find_all().await.unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_overwrites_existing_and_keeps_created_at(repository: InMemoryTaskRepository) {
        let mut task = task_due("Original", None);
        repository.save(&task).await.unwrap();

        task.apply(
            TaskChanges {
                title: "Changed".into(),
                description: Some("now described".into()),
                status: TaskStatus::InProgress,
                due_date: None,
            },
            noon() + Duration::hours(1),
        );
        let updated = repository.update(&task).await.unwrap().unwrap();

        assert_eq!(updated, task);
        assert_eq!(updated.created_at(), noon());
        assert_eq!(repository.find_by_id(task.id()).await.unwrap(), Some(task));
    }

    #[rstest]
    #[tokio::test]
    async fn update_never_inserts(repository: InMemoryTaskRepository) {
        let task = task_due("deleted meanwhile", None);
        repository.save(&task).await.unwrap();
        repository.delete_by_id(task.id()).await.unwrap();

        assert_eq!(repository.update(&task).await.unwrap(), None);
        assert!(!repository.exists_by_id(task.id()).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_is_a_noop_when_absent(repository: InMemoryTaskRepository) {
        let task = task_due("t", None);
        repository.save(&task).await.unwrap();

        repository.delete_by_id(Uuid::new_v4()).await.unwrap();
        assert!(repository.exists_by_id(task.id()).await.unwrap());

        repository.delete_by_id(task.id()).await.unwrap();
        repository.delete_by_id(task.id()).await.unwrap();
        assert!(!repository.exists_by_id(task.id()).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_status_returns_only_matches(repository: InMemoryTaskRepository) {
        let todo = task_due("todo", None);
        let mut started = task_due("started", None);
        started.apply(
            TaskChanges {
                title: "started".into(),
                description: None,
                status: TaskStatus::InProgress,
                due_date: None,
            },
            noon(),
        );
        repository.save(&todo).await.unwrap();
        repository.save(&started).await.unwrap();

        let in_progress = repository
            .find_by_status(TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(in_progress, vec![started]);

        let cancelled = repository
            .find_by_status(TaskStatus::Cancelled)
            .await
            .unwrap();
        assert!(cancelled.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_due_date_before_is_strict_and_skips_undated(
        repository: InMemoryTaskRepository,
    ) {
        let overdue = task_due("overdue", Some(noon() - Duration::days(1)));
        let exactly_now = task_due("exactly now", Some(noon()));
        let future = task_due("future", Some(noon() + Duration::days(1)));
        let undated = task_due("undated", None);
        for task in [&overdue, &exactly_now, &future, &undated] {
            repository.save(task).await.unwrap();
        }

        let found = repository.find_by_due_date_before(noon()).await.unwrap();

        assert_eq!(found, vec![overdue]);
    }
}

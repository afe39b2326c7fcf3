use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{Task, TaskStatus};
use super::repository::{RepositoryError, RepositoryResult, TaskRepository};

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    due_date: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status: TaskStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::CorruptRow(format!("task {}: {}", row.id, e)))?;

        Ok(Task::restore(
            row.id,
            row.title,
            row.description,
            status,
            row.due_date,
            row.created_at,
            row.updated_at,
        ))
    }
}

fn into_tasks(rows: Vec<TaskRow>) -> RepositoryResult<Vec<Task>> {
    rows.into_iter().map(Task::try_from).collect()
}

/// PostgreSQL-backed task storage.
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the migrations under `./migrations`.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, due_date, created_at, updated_at
            FROM tasks
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        into_tasks(rows)
    }

    async fn find_by_status(&self, status: TaskStatus) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, due_date, created_at, updated_at
            FROM tasks
            WHERE status = $1
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_tasks(rows)
    }

    async fn find_by_due_date_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, due_date, created_at, updated_at
            FROM tasks
            WHERE due_date < $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        into_tasks(rows)
    }

    async fn save(&self, task: &Task) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (id, title, description, status, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                due_date = EXCLUDED.due_date,
                updated_at = EXCLUDED.updated_at
            RETURNING id, title, description, status, due_date, created_at, updated_at
            "#,
        )
        .bind(task.id())
        .bind(task.title())
        .bind(task.description())
        .bind(task.status().as_str())
        .bind(task.due_date())
        .bind(task.created_at())
        .bind(task.updated_at())
        .fetch_one(&self.pool)
        .await?;

        Task::try_from(row)
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
            SET
                title = $2,
                description = $3,
                status = $4,
                due_date = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING id, title, description, status, due_date, created_at, updated_at
            "#,
        )
        .bind(task.id())
        .bind(task.title())
        .bind(task.description())
        .bind(task.status().as_str())
        .bind(task.due_date())
        .bind(task.updated_at())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists_by_id(&self, id: Uuid) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> TaskRow {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        TaskRow {
            id: Uuid::new_v4(),
            title: "Write report".into(),
            description: Some("quarterly".into()),
            status: status.into(),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_maps_to_task() {
        let task = Task::try_from(row("IN_PROGRESS")).unwrap();

        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(task.description(), Some("quarterly"));
    }

    #[test]
    fn row_with_unknown_status_is_corrupt() {
        let err = Task::try_from(row("ARCHIVED")).unwrap_err();

        assert!(matches!(err, RepositoryError::CorruptRow(msg) if msg.contains("ARCHIVED")));
    }
}

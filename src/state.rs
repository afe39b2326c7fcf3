use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::config::{Config, StorageMode};
use crate::routes::tasks::{
    InMemoryTaskRepository, PgTaskRepository, RepositoryError, TaskRepository, TaskService,
};

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub storage: StorageMode,
}

impl AppState {
    pub fn new(repository: Arc<dyn TaskRepository>, storage: StorageMode) -> Self {
        Self {
            tasks: TaskService::new(repository),
            storage,
        }
    }

    /// Opens the configured storage backend. Postgres is migrated before use.
    pub async fn connect(config: &Config) -> Result<Self, RepositoryError> {
        let repository: Arc<dyn TaskRepository> = match config.storage_mode {
            StorageMode::InMemory => Arc::new(InMemoryTaskRepository::new()),
            StorageMode::Postgres => {
                // presence is checked by Config::from_env
                let url = config.database_url.as_deref().unwrap_or_default();
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(url)
                    .await?;
                let repository = PgTaskRepository::new(pool);
                repository.migrate().await?;
                Arc::new(repository)
            }
        };

        Ok(Self::new(repository, config.storage_mode))
    }
}

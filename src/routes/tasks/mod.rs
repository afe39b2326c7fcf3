pub mod dto;
pub mod model;
pub mod queries;
pub mod repository;
pub mod routes;
pub mod service;

pub use dto::{TaskRequest, TaskResponse};
pub use model::{Task, TaskStatus};
pub use queries::PgTaskRepository;
pub use repository::{InMemoryTaskRepository, RepositoryError, TaskRepository};
pub use service::{TaskService, TaskServiceError};

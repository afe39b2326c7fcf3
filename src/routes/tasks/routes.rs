use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::dto::{ListTasksQuery, TaskRequest, TaskResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// JSON body whose rejections (bad syntax, wrong types, unknown status) become 400s.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct TaskJson<T>(pub T);

/// Path parameters; an id that is not a UUID becomes a 400.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct TaskPath<T>(pub T);

/// Query string; an unknown `status` becomes a 400.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct TaskQuery<T>(pub T);

/// Create a new task
pub async fn create(
    State(state): State<AppState>,
    TaskJson(body): TaskJson<TaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    body.validate()?;
    let task = state.tasks.create_task(body).await?;
    Ok(Json(task))
}

/// Get a single task by ID
pub async fn get(
    State(state): State<AppState>,
    TaskPath(id): TaskPath<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    state
        .tasks
        .get_task(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// List all tasks, optionally filtered by `?status=`
pub async fn list(
    State(state): State<AppState>,
    TaskQuery(query): TaskQuery<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = match query.status {
        Some(status) => state.tasks.get_tasks_by_status(status).await?,
        None => state.tasks.get_all_tasks().await?,
    };
    Ok(Json(tasks))
}

/// Replace the mutable fields of a task
pub async fn update(
    State(state): State<AppState>,
    TaskPath(id): TaskPath<Uuid>,
    TaskJson(body): TaskJson<TaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    body.validate()?;
    let task = state.tasks.update_task(id, body).await?;
    Ok(Json(task))
}

/// Delete a task; succeeds whether or not it existed
pub async fn delete(
    State(state): State<AppState>,
    TaskPath(id): TaskPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.tasks.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

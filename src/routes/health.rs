use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthData {
    status: u16,
    storage: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthData> {
    let health_data = HealthData {
        status: StatusCode::OK.as_u16(),
        storage: state.storage.as_str(),
    };
    Json(health_data)
}

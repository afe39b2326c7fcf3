//! Shared helpers for HTTP-level tests.
//!
//! Each integration test file is its own crate, so helpers unused by one
//! file would otherwise warn.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use task_tracker::config::StorageMode;
use task_tracker::routes;
use task_tracker::routes::tasks::InMemoryTaskRepository;
use task_tracker::state::AppState;

pub const ALLOWED_ORIGIN: &str = "http://localhost:4200";

/// Router backed by a fresh in-memory store.
pub fn test_app() -> Router {
    let state = AppState::new(Arc::new(InMemoryTaskRepository::new()), StorageMode::InMemory);
    routes::app(state, &[ALLOWED_ORIGIN.to_string()])
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body should be JSON")
}

/// Creates a task and returns its JSON representation.
pub async fn create_task(app: &Router, body: Value) -> Value {
    let response = send(app, json_request(Method::POST, "/api/tasks", &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

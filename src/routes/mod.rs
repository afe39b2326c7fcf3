use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

mod debug;
mod health;
pub mod middleware_cors;
pub mod tasks;

pub use health::health;

use crate::routes::middleware_cors::AllowedOrigins;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/debug/routing", get(debug::routing))
        .route(
            "/api/tasks",
            post(tasks::routes::create).get(tasks::routes::list),
        )
        .route(
            "/api/tasks/{id}",
            get(tasks::routes::get)
                .put(tasks::routes::update)
                .delete(tasks::routes::delete),
        )
}

/// Full application: routes plus origin enforcement, CORS headers and request tracing.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    let origins = AllowedOrigins::new(allowed_origins);

    routes()
        .layer(origins.cors_layer())
        .layer(middleware::from_fn_with_state(
            origins,
            middleware_cors::reject_disallowed_origin,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Welcome to the task tracker API"
}

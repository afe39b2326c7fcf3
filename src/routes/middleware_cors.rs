use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone)]
pub struct AllowedOrigins(Arc<[HeaderValue]>);

impl AllowedOrigins {
    pub fn new(origins: &[String]) -> Self {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                // a wildcard would allow every origin
                Ok(_) if origin == "*" => {
                    tracing::warn!("ignoring wildcard origin, list origins explicitly");
                    None
                }
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring origin that is not a valid header value");
                    None
                }
            })
            .collect();
        Self(values.into())
    }

    pub fn contains(&self, origin: &HeaderValue) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }

    /// Answers preflights and adds `Access-Control-Allow-*` headers for allowed origins.
    pub fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.0.iter().cloned()))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    }
}

/// Rejects cross-origin requests from origins outside the allowed list.
///
/// Requests without an `Origin` header pass through untouched.
pub async fn reject_disallowed_origin(
    State(origins): State<AllowedOrigins>,
    req: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let disallowed = req
        .headers()
        .get(header::ORIGIN)
        .filter(|origin| !origins.contains(origin))
        .cloned();

    if let Some(origin) = disallowed {
        tracing::warn!(origin = ?origin, path = %req.uri().path(), "rejected cross-origin request");
        return Err((StatusCode::FORBIDDEN, "Invalid CORS request"));
    }

    Ok(next.run(req).await)
}

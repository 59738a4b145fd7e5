use axum::{http::StatusCode, middleware, response::IntoResponse, Json, Router};
use serde_json::json;

use crate::UpstreamClient;

mod analyze;
mod health;
mod traffic_log;

// ---

pub fn router(client: UpstreamClient) -> Router {
    // ---
    Router::new()
        .merge(analyze::router())
        .merge(health::router())
        .fallback(not_found)
        .layer(middleware::from_fn(traffic_log::log_traffic))
        .with_state(client)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found." })))
}

// src/routes/health.rs
//! Health check endpoint for the weather insights service.
//!
//! `/health` is used by container orchestrators (e.g., Docker, Kubernetes) to
//! verify the service can do useful work, so unlike a bare liveness route it
//! probes the Weather Fetching Service and reports unhealthy when that
//! dependency cannot be reached.
//!
//! Follows the Explicit Module Boundary Pattern (EMBP): only the subrouter is
//! exported to the gateway (`mod.rs`).

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::warn;

use crate::{HealthStatus, UpstreamClient};

/// Handle `GET /health`.
///
/// Issues a bare GET against the upstream base URL (2 s timeout, same retry
/// policy as analysis calls). Any 2xx is healthy; everything else is a 500.
async fn health(State(client): State<UpstreamClient>) -> (StatusCode, Json<HealthStatus>) {
    // ---
    match client.probe().await {
        Ok(()) => (StatusCode::OK, Json(HealthStatus::healthy())),
        Err(e) => {
            warn!("Health probe of {} failed: {}", client.base_url(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(HealthStatus::unhealthy()))
        }
    }
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<UpstreamClient> {
    Router::new().route("/health", get(health))
}

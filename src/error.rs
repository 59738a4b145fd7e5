//! Handler error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

// ---

/// Errors a request handler can return; each maps to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("City is required.")]
    InvalidInput,

    #[error("Failed to fetch weather data: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        if let Self::Upstream(e) = &self {
            tracing::error!("Upstream failure: {}", e);
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_status_mapping() {
        // ---
        assert_eq!(ApiError::InvalidInput.status(), StatusCode::BAD_REQUEST);

        let upstream = ApiError::from(UpstreamError::Decode("expected value".into()));
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            upstream.to_string(),
            "Failed to fetch weather data: invalid weather payload: expected value"
        );
    }
}

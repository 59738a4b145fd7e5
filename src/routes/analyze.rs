use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde_json::Value;
use tracing::{debug, info};

use crate::{AnalysisResult, AnalyzeRequest, ApiError, UpstreamClient};

// ---

pub fn router() -> Router<UpstreamClient> {
    // ---
    Router::new().route("/analyze", post(handler))
}

async fn handler(
    State(client): State<UpstreamClient>,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    // ---
    let city = extract_city(&body).ok_or(ApiError::InvalidInput)?;
    info!("POST /analyze - city={:?}", city);

    // Step 1: Fetch the reading from upstream
    let reading = client.fetch_weather(&city).await?;
    debug!("POST /analyze - upstream reading {:?}", reading);

    // Step 2: Derive insights
    let result = reading.into_analysis();
    info!(
        "POST /analyze - {} insight(s) for {:?}",
        result.insights.len(),
        city
    );

    Ok(Json(result))
}

/// Pull a non-empty `city` out of the raw body.
///
/// The body is parsed by hand so that a non-JSON body, a non-object, or a
/// `city` of the wrong type all collapse into the same 400 instead of axum's
/// extractor rejections. Only a JSON object is accepted: serde would
/// otherwise read an array such as `["Paris"]` positionally into the struct.
fn extract_city(body: &[u8]) -> Option<String> {
    // ---
    let value = serde_json::from_slice::<Value>(body).ok()?;
    if !value.is_object() {
        return None;
    }

    serde_json::from_value::<AnalyzeRequest>(value)
        .ok()?
        .city
        .filter(|city| !city.is_empty())
}

//! Inference proxy handler.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use tracing::{error, info, warn};
use tryon_models::{TryOnRequest, TryOnResponse};

use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_body;
use crate::metrics::{record_tryon_outcome, record_upstream_duration};
use crate::state::AppState;

/// Relay a try-on request to the hosted model.
///
/// Exactly one upstream call is made per request. Nothing is retried.
pub async fn tryon(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<TryOnResponse>> {
    let request: TryOnRequest = parse_body(&body).inspect_err(|_| record_tryon_outcome("invalid"))?;

    let Some((user_image, cloth_image)) = request.images() else {
        record_tryon_outcome("missing_images");
        return Err(ApiError::bad_request("Missing images"));
    };

    let Some(api_key) = state.config.inference_api_key() else {
        warn!(env = %state.config.inference_api_key_env, "Try-on requested without an API key");
        record_tryon_outcome("not_configured");
        return Err(ApiError::not_configured("API key not configured"));
    };

    let start = Instant::now();
    let result = state
        .inference
        .generate(&api_key, user_image, cloth_image)
        .await;
    let elapsed = start.elapsed();
    record_upstream_duration(elapsed.as_secs_f64());

    match result {
        Ok(image) => {
            info!(
                duration_ms = elapsed.as_millis() as u64,
                image_len = image.len(),
                "Try-on image generated"
            );
            record_tryon_outcome("success");
            Ok(Json(TryOnResponse { image }))
        }
        Err(e) if e.is_no_image() => {
            warn!(model = %state.inference.model_url(), "Model response had no image");
            record_tryon_outcome("no_image");
            Err(ApiError::NoImage)
        }
        Err(e) => {
            error!(
                model = %state.inference.model_url(),
                error = %e,
                duration_ms = elapsed.as_millis() as u64,
                "Inference API call failed"
            );
            record_tryon_outcome("upstream_error");
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}

/// Fallback for every non-POST verb on the POST-only endpoints.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

//! Server-side pose overlay.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use tracing::{debug, warn};
use tryon_media::{decode_base64, encode_png_base64, render_image};
use tryon_models::{OverlayRequest, OverlayResponse};

use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_body;
use crate::metrics::record_overlay;
use crate::state::AppState;

pub async fn overlay(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<OverlayResponse>> {
    let request: OverlayRequest = parse_body(&body)?;

    let Some(encoded) = request.image.as_deref().filter(|s| !s.is_empty()) else {
        return Err(ApiError::bad_request("Missing image"));
    };

    let Some(provider) = state.pose_provider.clone() else {
        return Err(ApiError::not_configured("Landmark service not configured"));
    };

    let bytes = decode_base64(encoded).map_err(|e| {
        debug!(error = %e, "Rejecting overlay image");
        ApiError::bad_request("Invalid image")
    })?;

    let start = Instant::now();
    let frame = render_image(
        Arc::clone(&state.compositor),
        provider,
        state.pose_options.clone(),
        bytes,
    )
    .await
    .map_err(|e| {
        if e.is_input_error() {
            debug!(error = %e, "Rejecting overlay image");
            ApiError::bad_request("Invalid image")
        } else {
            ApiError::internal(e.to_string())
        }
    })?;

    if let Some(reason) = &frame.detection_error {
        warn!(error = %reason, "Overlay served without landmarks");
    }

    let image = encode_png_base64(&frame.image).map_err(|e| ApiError::internal(e.to_string()))?;
    record_overlay(frame.garment_drawn, start.elapsed().as_secs_f64());

    Ok(Json(OverlayResponse {
        image,
        keypoints: frame.landmarks,
        placement: frame.placement,
        garment_drawn: frame.garment_drawn,
    }))
}

//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub inference_credential: CheckStatus,
    pub garment_sprite: CheckStatus,
    pub landmark_service: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    fn disabled(msg: impl Into<String>) -> Self {
        Self {
            status: "disabled".to_string(),
            error: Some(msg.into()),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
        }
    }
}

/// Readiness check endpoint (readiness probe).
///
/// Only a missing inference credential makes the server not ready; the
/// overlay features degrade instead.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let credential = if state.config.inference_api_key().is_some() {
        CheckStatus::ok()
    } else {
        CheckStatus::error(format!("{} is not set", state.config.inference_api_key_env))
    };

    let garment = if state.compositor.has_garment() {
        CheckStatus::ok()
    } else {
        CheckStatus::disabled(format!(
            "sprite not loaded from {}",
            state.config.garment_sprite_path.display()
        ))
    };

    let landmarks = match &state.pose_provider {
        Some(_) => CheckStatus::ok(),
        None => CheckStatus::disabled("LANDMARK_SERVICE_URL is not set"),
    };

    let is_ready = credential.status == "ok";
    let response = ReadinessResponse {
        status: if is_ready { "ready" } else { "not_ready" }.to_string(),
        checks: ReadinessChecks {
            inference_credential: credential,
            garment_sprite: garment,
            landmark_service: landmarks,
        },
    };

    if is_ready {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

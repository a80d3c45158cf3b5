//! Application state.

use std::sync::Arc;

use tracing::{info, warn};
use tryon_media::{Compositor, MediaError, PoseProvider, RemotePoseProvider};
use tryon_ml_client::{InferenceClient, InferenceConfig, LandmarkClient};
use tryon_models::PoseOptions;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub inference: Arc<InferenceClient>,
    pub compositor: Arc<Compositor>,
    pub pose_provider: Option<Arc<dyn PoseProvider>>,
    pub pose_options: PoseOptions,
}

impl AppState {
    /// Create new application state.
    ///
    /// A missing garment sprite is not fatal: overlays are then served
    /// without the garment layer.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let inference = InferenceClient::new(InferenceConfig {
            model_url: config.inference_model_url.clone(),
            timeout: config.inference_timeout,
        })
        .map_err(|e| ApiError::internal(e.to_string()))?;

        if config.inference_api_key().is_none() {
            warn!(
                env = %config.inference_api_key_env,
                "Inference API key not set; /api/tryon will fail until it is"
            );
        }

        let compositor = match Compositor::load_garment(&config.garment_sprite_path) {
            Ok(sprite) => Compositor::default().with_garment(sprite),
            Err(MediaError::AssetNotFound(path)) => {
                warn!(path = %path.display(), "Garment sprite not found; overlays will omit the garment");
                Compositor::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load garment sprite; overlays will omit the garment");
                Compositor::default()
            }
        };

        let pose_provider = match &config.landmark_service_url {
            Some(url) => {
                let client = LandmarkClient::new(url.clone(), config.landmark_timeout)
                    .map_err(|e| ApiError::internal(e.to_string()))?;
                info!(url = %url, "Landmark service configured");
                Some(Arc::new(RemotePoseProvider::new(client)) as Arc<dyn PoseProvider>)
            }
            None => {
                info!("No landmark service configured; /api/overlay disabled");
                None
            }
        };

        Ok(Self {
            config,
            inference: Arc::new(inference),
            compositor: Arc::new(compositor),
            pose_provider,
            pose_options: PoseOptions::default(),
        })
    }

    /// Replace the pose provider.
    pub fn with_pose_provider(mut self, provider: Arc<dyn PoseProvider>) -> Self {
        self.pose_provider = Some(provider);
        self
    }
}

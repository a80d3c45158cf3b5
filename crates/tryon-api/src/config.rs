//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use tryon_ml_client::DEFAULT_MODEL_URL;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Try-on model endpoint
    pub inference_model_url: String,
    /// Name of the environment variable holding the model API key
    pub inference_api_key_env: String,
    /// Timeout for the outbound try-on call
    pub inference_timeout: Duration,
    /// Landmark service endpoint, if overlays are served
    pub landmark_service_url: Option<String>,
    /// Timeout for landmark service calls
    pub landmark_timeout: Duration,
    /// Garment sprite drawn by the overlay endpoint
    pub garment_sprite_path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 10 * 1024 * 1024, // 10MB
            environment: "development".to_string(),
            metrics_enabled: true,
            inference_model_url: DEFAULT_MODEL_URL.to_string(),
            inference_api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            inference_timeout: Duration::from_secs(60),
            landmark_service_url: None,
            landmark_timeout: Duration::from_secs(30),
            garment_sprite_path: PathBuf::from("assets/tshirt.png"),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parse("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            inference_model_url: std::env::var("INFERENCE_MODEL_URL")
                .unwrap_or(defaults.inference_model_url),
            inference_api_key_env: std::env::var("INFERENCE_API_KEY_ENV")
                .unwrap_or(defaults.inference_api_key_env),
            inference_timeout: env_parse("INFERENCE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.inference_timeout),
            landmark_service_url: std::env::var("LANDMARK_SERVICE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            landmark_timeout: env_parse("LANDMARK_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.landmark_timeout),
            garment_sprite_path: std::env::var("GARMENT_SPRITE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.garment_sprite_path),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Read the model API key from the environment.
    ///
    /// Read on every call so that a rotated or newly set key takes effect
    /// without a restart. Empty values count as unset.
    pub fn inference_api_key(&self) -> Option<String> {
        std::env::var(&self.inference_api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

//! Client for an HTTP pose-landmark service.
//!
//! The service receives an encoded image and answers with a landmark list,
//! either bare or wrapped as `{"landmarks": [...]}`. The payload is mapped
//! into a [`LandmarkSet`] before it leaves this module.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use tryon_models::{LandmarkSet, PoseOptions};

use crate::error::{MlError, MlResult};

/// Client for the landmark service.
#[derive(Debug, Clone)]
pub struct LandmarkClient {
    url: String,
    timeout: Duration,
    client: Client,
}

impl LandmarkClient {
    /// Create a new landmark client.
    pub fn new(url: impl Into<String>, timeout: Duration) -> MlResult<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(MlError::Config("landmark service URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MlError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            timeout,
            client,
        })
    }

    /// Detect landmarks in a PNG-encoded image.
    pub async fn detect(&self, png: Vec<u8>, options: &PoseOptions) -> MlResult<LandmarkSet> {
        let response = self
            .client
            .post(&self.url)
            .query(options)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await
            .map_err(|e| MlError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MlError::Decode(e.to_string()))?;

        let landmarks =
            LandmarkSet::from_json(&value).map_err(|e| MlError::Decode(e.to_string()))?;

        debug!(
            slots = landmarks.len(),
            present = landmarks.iter().count(),
            "Landmark service responded"
        );

        Ok(landmarks)
    }
}

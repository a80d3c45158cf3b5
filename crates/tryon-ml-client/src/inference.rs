//! Client for the hosted composite-generation model.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{MlError, MlResult};

/// Default model endpoint.
pub const DEFAULT_MODEL_URL: &str = "https://api-inference.huggingface.co/models/zanxiaojun/viton";

/// Inference client configuration.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Model endpoint URL
    pub model_url: String,
    /// Timeout for the whole outbound call
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: InferenceInputs<'a>,
}

#[derive(Debug, Serialize)]
struct InferenceInputs<'a> {
    user_image: &'a str,
    cloth_image: &'a str,
}

/// Client for the try-on model.
///
/// Performs exactly one request per call: no retries, no caching.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    config: InferenceConfig,
    client: Client,
}

impl InferenceClient {
    /// Create a new inference client.
    pub fn new(config: InferenceConfig) -> MlResult<Self> {
        if config.model_url.is_empty() {
            return Err(MlError::Config("model URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MlError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Model endpoint this client talks to.
    pub fn model_url(&self) -> &str {
        &self.config.model_url
    }

    /// Generate a composite of the garment worn by the user.
    ///
    /// Returns the base64 image from the model's `image` field. A successful
    /// response without that field yields [`MlError::NoImage`].
    pub async fn generate(
        &self,
        api_key: &str,
        user_image: &str,
        cloth_image: &str,
    ) -> MlResult<String> {
        let request = InferenceRequest {
            inputs: InferenceInputs {
                user_image,
                cloth_image,
            },
        };

        debug!(
            model_url = %self.config.model_url,
            user_image_len = user_image.len(),
            cloth_image_len = cloth_image.len(),
            "Sending try-on inference request"
        );

        let response = self
            .client
            .post(&self.config.model_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MlError::from_reqwest(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MlError::from_reqwest(e, self.config.timeout))?;

        let image = extract_image(&body).ok_or(MlError::NoImage)?;
        info!(image_len = image.len(), "Try-on inference succeeded");
        Ok(image)
    }
}

/// Pull a non-empty string `image` field out of a response body.
/// Bodies that are not JSON objects carry no image.
fn extract_image(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("image")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> InferenceClient {
        InferenceClient::new(InferenceConfig {
            model_url: format!("{}/models/viton", server.uri()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_extract_image() {
        assert_eq!(extract_image(br#"{"image":"abc"}"#), Some("abc".to_string()));
        assert_eq!(extract_image(br#"{"image":""}"#), None);
        assert_eq!(extract_image(br#"{"image":42}"#), None);
        assert_eq!(extract_image(br#"{"other":"abc"}"#), None);
        assert_eq!(extract_image(b"not json"), None);
    }

    #[test]
    fn test_empty_url_rejected() {
        let err = InferenceClient::new(InferenceConfig {
            model_url: String::new(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, MlError::Config(_)));
    }

    #[tokio::test]
    async fn test_generate_forwards_images_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/viton"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({
                "inputs": {"user_image": "dXNlcg==", "cloth_image": "Y2xvdGg="}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"image": "cmVzdWx0"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let image = client.generate("secret", "dXNlcg==", "Y2xvdGg=").await.unwrap();
        assert_eq!(image, "cmVzdWx0");
    }

    #[tokio::test]
    async fn test_generate_without_image_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "loading"})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate("k", "a", "b").await.unwrap_err();
        assert!(err.is_no_image());
    }

    #[tokio::test]
    async fn test_generate_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate("k", "a", "b").await.unwrap_err();
        match err {
            MlError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model is loading");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"image": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = InferenceClient::new(InferenceConfig {
            model_url: server.uri(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();

        let err = client.generate("k", "a", "b").await.unwrap_err();
        assert!(matches!(err, MlError::Timeout(_)));
    }
}

//! Request and response bodies for the try-on HTTP API.

use serde::{Deserialize, Serialize};

use crate::keypoint::LandmarkSet;
use crate::rect::PlacementRect;

/// Body of `POST /api/tryon`.
///
/// Both fields are optional at parse time so that a missing image can be
/// reported with a proper message instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnRequest {
    /// Base64 photo of the user
    #[serde(default)]
    pub user_image: Option<String>,
    /// Base64 photo of the garment
    #[serde(default)]
    pub cloth_image: Option<String>,
}

impl TryOnRequest {
    pub fn new(user_image: impl Into<String>, cloth_image: impl Into<String>) -> Self {
        Self {
            user_image: Some(user_image.into()),
            cloth_image: Some(cloth_image.into()),
        }
    }

    /// Both images, if both are present and non-empty.
    pub fn images(&self) -> Option<(&str, &str)> {
        let user = self.user_image.as_deref().filter(|s| !s.is_empty())?;
        let cloth = self.cloth_image.as_deref().filter(|s| !s.is_empty())?;
        Some((user, cloth))
    }
}

/// Successful try-on result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryOnResponse {
    /// Base64 composite produced by the model
    pub image: String,
}

/// Error body shared by every API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `POST /api/overlay`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayRequest {
    /// Base64 photo or `data:` URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Server-side composite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayResponse {
    /// Base64 PNG of the composite
    pub image: String,
    /// Landmarks found in the photo
    pub keypoints: LandmarkSet,
    /// Where the garment was placed, if the torso was found
    pub placement: Option<PlacementRect>,
    /// Whether the garment sprite was drawn
    pub garment_drawn: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tryon_request_parsing() {
        let req: TryOnRequest =
            serde_json::from_value(json!({"userImage": "abc", "clothImage": "def"})).unwrap();
        assert_eq!(req.images(), Some(("abc", "def")));

        let req: TryOnRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.images().is_none());

        let req: TryOnRequest =
            serde_json::from_value(json!({"userImage": "", "clothImage": "def"})).unwrap();
        assert!(req.images().is_none());

        let req: TryOnRequest =
            serde_json::from_value(json!({"userImage": "abc", "clothImage": null})).unwrap();
        assert!(req.images().is_none());
    }

    #[test]
    fn test_overlay_response_wire_names() {
        let resp = OverlayResponse {
            image: "png".to_string(),
            keypoints: LandmarkSet::empty(),
            placement: None,
            garment_drawn: false,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["garmentDrawn"], false);
        assert_eq!(value["keypoints"], json!([]));
        assert!(value["placement"].is_null());
    }
}

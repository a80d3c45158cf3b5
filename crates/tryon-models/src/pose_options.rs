use serde::{Deserialize, Serialize};

/// Options handed to a pose provider when a detector is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseOptions {
    /// Model size/accuracy tradeoff (0, 1 or 2)
    pub model_complexity: u8,
    /// Smooth landmarks across consecutive frames
    pub smooth_landmarks: bool,
    /// Also produce a segmentation mask
    pub enable_segmentation: bool,
    /// Minimum confidence for the person detector
    pub min_detection_confidence: f64,
    /// Minimum confidence for landmark tracking
    pub min_tracking_confidence: f64,
}

impl Default for PoseOptions {
    fn default() -> Self {
        Self {
            model_complexity: 1,
            smooth_landmarks: true,
            enable_segmentation: false,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_camel_case() {
        let value = serde_json::to_value(PoseOptions::default()).unwrap();
        assert_eq!(value["modelComplexity"], 1);
        assert_eq!(value["minDetectionConfidence"], 0.5);
        assert_eq!(value["enableSegmentation"], false);
    }
}

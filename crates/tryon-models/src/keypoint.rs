//! Body keypoints and landmark sets.
//!
//! Pose providers return loosely-typed landmark lists. They are mapped into
//! [`LandmarkSet`] as soon as they cross the crate boundary so the rest of
//! the system works with a fixed 33-point schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// BlazePose landmark indices (33 points).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    /// Number of landmarks in the topology.
    pub const COUNT: usize = 33;

    /// Positional index of this landmark.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single detected body joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Normalized X coordinate (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Normalized Y coordinate (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Detection confidence (0.0 to 1.0)
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Convert to pixel coordinates for a canvas of the given size.
    pub fn to_pixel(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * width as f64, self.y * height as f64)
    }

    /// Whether the confidence reaches the threshold.
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }

    /// Whether both coordinates lie within one frame of the canvas
    /// (normalized range [-1, 2]). Points further out are not drawable.
    pub fn is_in_frame(&self) -> bool {
        let range = Self::FRAME_MIN..=Self::FRAME_MAX;
        range.contains(&self.x) && range.contains(&self.y)
    }

    const FRAME_MIN: f64 = -1.0;
    const FRAME_MAX: f64 = 2.0;
}

/// Landmark as reported by a pose provider, before validation.
///
/// Every field is optional; `visibility` is the provider's name for
/// confidence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLandmark {
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
    #[serde(alias = "confidence", alias = "score")]
    pub visibility: Option<f64>,
}

impl RawLandmark {
    /// Map to a keypoint. Missing, non-finite or far off-frame
    /// coordinates yield `None`. A missing visibility counts as fully
    /// visible.
    pub fn to_keypoint(&self) -> Option<Keypoint> {
        let x = self.x.filter(|v| v.is_finite())?;
        let y = self.y.filter(|v| v.is_finite())?;
        let confidence = self
            .visibility
            .filter(|v| v.is_finite())
            .unwrap_or(1.0);
        Some(Keypoint::new(x, y, confidence)).filter(Keypoint::is_in_frame)
    }
}

/// Errors raised while reading landmark payloads.
#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("Too many landmarks: {0} (max {max})", max = PoseLandmark::COUNT)]
    TooMany(usize),

    #[error("Malformed landmark payload: {0}")]
    Malformed(String),
}

/// Positional set of up to 33 optional keypoints.
///
/// An index past the end of the set, or a `None` entry, is an absent
/// landmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<Keypoint>>", into = "Vec<Option<Keypoint>>")]
pub struct LandmarkSet {
    points: Vec<Option<Keypoint>>,
}

impl LandmarkSet {
    /// Create an empty set (no pose detected).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from provider output, keeping at most 33 entries.
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = Option<RawLandmark>>,
    {
        let points = raw
            .into_iter()
            .take(PoseLandmark::COUNT)
            .map(|lm| lm.and_then(|lm| lm.to_keypoint()))
            .collect();
        Self { points }
    }

    /// Parse a provider JSON payload.
    ///
    /// Accepts a bare array, or an object with a `landmarks` or
    /// `poseLandmarks` array. `null` and a missing array both mean no pose.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, LandmarkError> {
        let list = match value {
            serde_json::Value::Null => return Ok(Self::empty()),
            serde_json::Value::Array(_) => value,
            serde_json::Value::Object(map) => {
                match map.get("landmarks").or_else(|| map.get("poseLandmarks")) {
                    Some(serde_json::Value::Null) | None => return Ok(Self::empty()),
                    Some(list) => list,
                }
            }
            other => {
                return Err(LandmarkError::Malformed(format!(
                    "expected array or object, got {}",
                    other
                )))
            }
        };

        let raw: Vec<Option<RawLandmark>> = serde_json::from_value(list.clone())
            .map_err(|e| LandmarkError::Malformed(e.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    /// Get a landmark if present.
    pub fn get(&self, landmark: PoseLandmark) -> Option<&Keypoint> {
        self.get_index(landmark.index())
    }

    /// Get a landmark by positional index if present.
    pub fn get_index(&self, index: usize) -> Option<&Keypoint> {
        self.points.get(index).and_then(Option::as_ref)
    }

    /// Number of slots in the set (present or not).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over present keypoints with their index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Keypoint)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    }

    /// Shoulders and hips, only when all four are present.
    pub fn torso(&self) -> Option<TorsoKeypoints> {
        Some(TorsoKeypoints {
            left_shoulder: *self.get(PoseLandmark::LeftShoulder)?,
            right_shoulder: *self.get(PoseLandmark::RightShoulder)?,
            left_hip: *self.get(PoseLandmark::LeftHip)?,
            right_hip: *self.get(PoseLandmark::RightHip)?,
        })
    }

    /// Set or clear a landmark, growing the set as needed.
    pub fn set(&mut self, landmark: PoseLandmark, keypoint: Option<Keypoint>) {
        let index = landmark.index();
        if self.points.len() <= index {
            self.points.resize(index + 1, None);
        }
        self.points[index] = keypoint;
    }
}

impl TryFrom<Vec<Option<Keypoint>>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(points: Vec<Option<Keypoint>>) -> Result<Self, Self::Error> {
        if points.len() > PoseLandmark::COUNT {
            return Err(LandmarkError::TooMany(points.len()));
        }
        Ok(Self { points })
    }
}

impl From<LandmarkSet> for Vec<Option<Keypoint>> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

/// The four keypoints that drive garment placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorsoKeypoints {
    pub left_shoulder: Keypoint,
    pub right_shoulder: Keypoint,
    pub left_hip: Keypoint,
    pub right_hip: Keypoint,
}

//! Shared data models for the try-on backend.
//!
//! This crate provides Serde-serializable types for:
//! - Body keypoints and fixed-schema landmark sets
//! - The pose skeleton topology
//! - Garment placement rectangles
//! - Try-on and overlay request/response bodies

pub mod keypoint;
pub mod pose_options;
pub mod rect;
pub mod skeleton;
pub mod tryon;

// Re-export common types
pub use keypoint::{Keypoint, LandmarkError, LandmarkSet, PoseLandmark, RawLandmark, TorsoKeypoints};
pub use pose_options::PoseOptions;
pub use rect::PlacementRect;
pub use skeleton::POSE_CONNECTIONS;
pub use tryon::{ErrorMessage, OverlayRequest, OverlayResponse, TryOnRequest, TryOnResponse};

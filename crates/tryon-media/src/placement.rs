//! Garment placement from torso landmarks.
//!
//! The garment is sized from shoulder width and torso height, with a floor
//! relative to the canvas so it stays visible when the shoulders are
//! foreshortened, then centered on the shoulders and nudged up to cover the
//! collar.

use tryon_models::{Keypoint, LandmarkSet, PlacementRect};

/// Tunable constants for the placement heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    /// Garment width as a multiple of shoulder width
    pub width_scale: f64,
    /// Minimum garment width as a fraction of canvas width
    pub min_width_ratio: f64,
    /// Garment height as a multiple of torso height
    pub height_scale: f64,
    /// Minimum garment height as a fraction of canvas height
    pub min_height_ratio: f64,
    /// Upward shift as a fraction of garment height
    pub vertical_offset_ratio: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            width_scale: 1.8,
            min_width_ratio: 0.3,
            height_scale: 2.0,
            min_height_ratio: 0.4,
            vertical_offset_ratio: 0.15,
        }
    }
}

/// Compute where the garment goes on a `width` x `height` canvas.
///
/// Returns `None` unless both shoulders and both hips are present and
/// in frame.
pub fn compute_placement(
    landmarks: &LandmarkSet,
    width: u32,
    height: u32,
    config: &PlacementConfig,
) -> Option<PlacementRect> {
    let torso = landmarks.torso()?;
    let corners = [torso.left_shoulder, torso.right_shoulder, torso.left_hip, torso.right_hip];
    if !corners.iter().all(Keypoint::is_in_frame) {
        return None;
    }

    let (left_shoulder_x, left_shoulder_y) = torso.left_shoulder.to_pixel(width, height);
    let (right_shoulder_x, right_shoulder_y) = torso.right_shoulder.to_pixel(width, height);
    let (_, left_hip_y) = torso.left_hip.to_pixel(width, height);
    let (_, right_hip_y) = torso.right_hip.to_pixel(width, height);

    let shoulder_mid_x = (left_shoulder_x + right_shoulder_x) / 2.0;
    let shoulder_mid_y = (left_shoulder_y + right_shoulder_y) / 2.0;
    let hip_mid_y = (left_hip_y + right_hip_y) / 2.0;

    let shoulder_width = (right_shoulder_x - left_shoulder_x).abs();
    let torso_height = (hip_mid_y - shoulder_mid_y).abs();

    let shirt_width = (shoulder_width * config.width_scale).max(width as f64 * config.min_width_ratio);
    let shirt_height =
        (torso_height * config.height_scale).max(height as f64 * config.min_height_ratio);

    let x = shoulder_mid_x - shirt_width / 2.0;
    let y = shoulder_mid_y - shirt_height * config.vertical_offset_ratio;

    Some(PlacementRect::new(x, y, shirt_width, shirt_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryon_models::{Keypoint, PoseLandmark};

    fn torso_set(ls: (f64, f64), rs: (f64, f64), lh: (f64, f64), rh: (f64, f64)) -> LandmarkSet {
        let mut set = LandmarkSet::empty();
        set.set(PoseLandmark::LeftShoulder, Some(Keypoint::new(ls.0, ls.1, 0.9)));
        set.set(PoseLandmark::RightShoulder, Some(Keypoint::new(rs.0, rs.1, 0.9)));
        set.set(PoseLandmark::LeftHip, Some(Keypoint::new(lh.0, lh.1, 0.9)));
        set.set(PoseLandmark::RightHip, Some(Keypoint::new(rh.0, rh.1, 0.9)));
        set
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_placement() {
        let set = torso_set((0.3, 0.4), (0.7, 0.4), (0.35, 0.8), (0.65, 0.8));
        let rect = compute_placement(&set, 1000, 1000, &PlacementConfig::default()).unwrap();

        assert_close(rect.width, 720.0);
        assert_close(rect.height, 800.0);
        assert_close(rect.x, 140.0);
        assert_close(rect.y, 280.0);
    }

    #[test]
    fn test_minimum_size_floor() {
        // Shoulders nearly on top of each other, hips close to shoulders
        let set = torso_set((0.5, 0.5), (0.51, 0.5), (0.5, 0.52), (0.51, 0.52));
        let rect = compute_placement(&set, 800, 600, &PlacementConfig::default()).unwrap();

        assert_close(rect.width, 240.0);
        assert_close(rect.height, 240.0);
        assert_close(rect.x, 0.505 * 800.0 - 120.0);
        assert_close(rect.y, 300.0 - 36.0);
    }

    #[test]
    fn test_mirrored_shoulders_use_absolute_width() {
        // Subject facing away: left shoulder on the right of the image
        let set = torso_set((0.7, 0.4), (0.3, 0.4), (0.65, 0.8), (0.35, 0.8));
        let rect = compute_placement(&set, 1000, 1000, &PlacementConfig::default()).unwrap();
        assert_close(rect.width, 720.0);
        assert_close(rect.x, 140.0);
    }

    #[test]
    fn test_missing_torso_keypoint_skips_placement() {
        let full = torso_set((0.3, 0.4), (0.7, 0.4), (0.35, 0.8), (0.65, 0.8));
        for missing in [
            PoseLandmark::LeftShoulder,
            PoseLandmark::RightShoulder,
            PoseLandmark::LeftHip,
            PoseLandmark::RightHip,
        ] {
            let mut set = full.clone();
            set.set(missing, None);
            assert!(compute_placement(&set, 1000, 1000, &PlacementConfig::default()).is_none());
        }
        assert!(compute_placement(&LandmarkSet::empty(), 100, 100, &PlacementConfig::default()).is_none());
    }

    #[test]
    fn test_off_frame_torso_skips_placement() {
        let set = torso_set((0.3, 0.4), (4e9, 0.4), (0.35, 0.8), (0.65, 0.8));
        assert!(compute_placement(&set, 1000, 1000, &PlacementConfig::default()).is_none());
    }
}

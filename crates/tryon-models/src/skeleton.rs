//! Pose skeleton topology.

use crate::keypoint::PoseLandmark;

use PoseLandmark::*;

/// Skeleton edges (start landmark, end landmark) for the 33-point topology.
pub const POSE_CONNECTIONS: [(PoseLandmark, PoseLandmark); 35] = [
    // Face
    (Nose, LeftEyeInner),
    (LeftEyeInner, LeftEye),
    (LeftEye, LeftEyeOuter),
    (LeftEyeOuter, LeftEar),
    (Nose, RightEyeInner),
    (RightEyeInner, RightEye),
    (RightEye, RightEyeOuter),
    (RightEyeOuter, RightEar),
    (MouthLeft, MouthRight),
    // Arms
    (LeftShoulder, RightShoulder),
    (LeftShoulder, LeftElbow),
    (LeftElbow, LeftWrist),
    (LeftWrist, LeftPinky),
    (LeftWrist, LeftIndex),
    (LeftWrist, LeftThumb),
    (LeftPinky, LeftIndex),
    (RightShoulder, RightElbow),
    (RightElbow, RightWrist),
    (RightWrist, RightPinky),
    (RightWrist, RightIndex),
    (RightWrist, RightThumb),
    (RightPinky, RightIndex),
    // Torso
    (LeftShoulder, LeftHip),
    (RightShoulder, RightHip),
    (LeftHip, RightHip),
    // Legs
    (LeftHip, LeftKnee),
    (RightHip, RightKnee),
    (LeftKnee, LeftAnkle),
    (RightKnee, RightAnkle),
    (LeftAnkle, LeftHeel),
    (RightAnkle, RightHeel),
    (LeftHeel, LeftFootIndex),
    (RightHeel, RightFootIndex),
    (LeftAnkle, LeftFootIndex),
    (RightAnkle, RightFootIndex),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_connections_are_unique_and_in_range() {
        let mut seen = HashSet::new();
        for (a, b) in POSE_CONNECTIONS {
            assert!(a.index() < PoseLandmark::COUNT);
            assert!(b.index() < PoseLandmark::COUNT);
            assert_ne!(a, b);
            assert!(seen.insert((a.index().min(b.index()), a.index().max(b.index()))));
        }
    }
}

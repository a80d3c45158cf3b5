//! Pose provider traits.
//!
//! A [`PoseProvider`] opens one [`PoseDetector`] per submitted image. The
//! detector is wrapped in a [`DetectorGuard`] so it is closed exactly once,
//! whether the run completes, fails, or is aborted because a newer image
//! superseded it.

use async_trait::async_trait;
use image::DynamicImage;
use tracing::{debug, warn};
use tryon_models::{LandmarkSet, PoseOptions};

use crate::error::MediaResult;

/// A live pose detector instance.
#[async_trait]
pub trait PoseDetector: Send {
    /// Detect body landmarks in an image.
    ///
    /// Returns an empty set when no person is found.
    async fn detect(&mut self, image: &DynamicImage) -> MediaResult<LandmarkSet>;

    /// Release detector resources. Called once by [`DetectorGuard`].
    fn close(&mut self) {}

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

/// Opens pose detectors.
#[async_trait]
pub trait PoseProvider: Send + Sync {
    /// Open a detector configured with `options`.
    async fn open(&self, options: &PoseOptions) -> MediaResult<Box<dyn PoseDetector>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Closes the wrapped detector when dropped.
pub struct DetectorGuard {
    detector: Option<Box<dyn PoseDetector>>,
}

impl DetectorGuard {
    pub fn new(detector: Box<dyn PoseDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// Run detection with the guarded detector.
    pub async fn detect(&mut self, image: &DynamicImage) -> MediaResult<LandmarkSet> {
        match self.detector.as_mut() {
            Some(detector) => detector.detect(image).await,
            None => Err(crate::error::MediaError::Cancelled),
        }
    }

    /// Close the detector now.
    pub fn close(&mut self) {
        if let Some(mut detector) = self.detector.take() {
            debug!(detector = detector.name(), "Closing pose detector");
            detector.close();
        }
    }
}

impl Drop for DetectorGuard {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open a detector and run it once.
///
/// Failures are not fatal for compositing: they come back as the error
/// string alongside an empty landmark set.
pub async fn detect_landmarks(
    provider: &dyn PoseProvider,
    options: &PoseOptions,
    image: &DynamicImage,
) -> (LandmarkSet, Option<String>) {
    let detector = match provider.open(options).await {
        Ok(detector) => detector,
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Failed to open pose detector");
            return (LandmarkSet::empty(), Some(e.to_string()));
        }
    };

    let mut guard = DetectorGuard::new(detector);
    let result = guard.detect(image).await;
    guard.close();

    match result {
        Ok(landmarks) => (landmarks, None),
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Pose detection failed");
            (LandmarkSet::empty(), Some(e.to_string()))
        }
    }
}

/// Provider that always reports the same landmarks.
///
/// Used for landmarks computed elsewhere, e.g. loaded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct FixedPoseProvider {
    landmarks: LandmarkSet,
}

impl FixedPoseProvider {
    pub fn new(landmarks: LandmarkSet) -> Self {
        Self { landmarks }
    }
}

struct FixedPoseDetector {
    landmarks: LandmarkSet,
}

#[async_trait]
impl PoseDetector for FixedPoseDetector {
    async fn detect(&mut self, _image: &DynamicImage) -> MediaResult<LandmarkSet> {
        Ok(self.landmarks.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[async_trait]
impl PoseProvider for FixedPoseProvider {
    async fn open(&self, _options: &PoseOptions) -> MediaResult<Box<dyn PoseDetector>> {
        Ok(Box::new(FixedPoseDetector {
            landmarks: self.landmarks.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tryon_models::{Keypoint, PoseLandmark};

    struct FailingProvider {
        fail_open: bool,
        closed: Arc<AtomicUsize>,
    }

    struct FailingDetector {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PoseDetector for FailingDetector {
        async fn detect(&mut self, _image: &DynamicImage) -> MediaResult<LandmarkSet> {
            Err(MediaError::detection("model crashed"))
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[async_trait]
    impl PoseProvider for FailingProvider {
        async fn open(&self, _options: &PoseOptions) -> MediaResult<Box<dyn PoseDetector>> {
            if self.fail_open {
                return Err(MediaError::detection("no model"));
            }
            Ok(Box::new(FailingDetector {
                closed: Arc::clone(&self.closed),
            }))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn image() -> DynamicImage {
        DynamicImage::new_rgba8(8, 8)
    }

    #[tokio::test]
    async fn test_fixed_provider_returns_landmarks() {
        let mut set = LandmarkSet::empty();
        set.set(PoseLandmark::Nose, Some(Keypoint::new(0.5, 0.5, 1.0)));
        let provider = FixedPoseProvider::new(set.clone());

        let (landmarks, error) = detect_landmarks(&provider, &PoseOptions::default(), &image()).await;
        assert_eq!(landmarks, set);
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn test_detection_failure_is_not_fatal_and_closes_detector() {
        let closed = Arc::new(AtomicUsize::new(0));
        let provider = FailingProvider {
            fail_open: false,
            closed: Arc::clone(&closed),
        };

        let (landmarks, error) = detect_landmarks(&provider, &PoseOptions::default(), &image()).await;
        assert!(landmarks.is_empty());
        assert!(error.unwrap().contains("model crashed"));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_open_failure_is_not_fatal() {
        let provider = FailingProvider {
            fail_open: true,
            closed: Arc::new(AtomicUsize::new(0)),
        };
        let (landmarks, error) = detect_landmarks(&provider, &PoseOptions::default(), &image()).await;
        assert!(landmarks.is_empty());
        assert!(error.unwrap().contains("no model"));
    }

    #[test]
    fn test_guard_closes_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut guard = DetectorGuard::new(Box::new(FailingDetector {
            closed: Arc::clone(&closed),
        }));
        guard.close();
        drop(guard);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }
}

//! One-shot render pipeline: decode, detect, composite.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use tracing::info;
use tryon_models::PoseOptions;

use crate::codec::decode_image;
use crate::compositor::{CompositeFrame, Compositor};
use crate::detector::{detect_landmarks, PoseProvider};
use crate::error::{MediaError, MediaResult};

/// Render one composite from encoded image bytes.
///
/// Decoding failures are errors. Detector failures are not: the frame then
/// carries the base image only and `detection_error` is set.
pub async fn render_image(
    compositor: Arc<Compositor>,
    provider: Arc<dyn PoseProvider>,
    options: PoseOptions,
    bytes: Vec<u8>,
) -> MediaResult<CompositeFrame> {
    let start = Instant::now();

    let image: DynamicImage = tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| MediaError::internal(format!("decode task failed: {}", e)))??;

    let (landmarks, detection_error) = detect_landmarks(provider.as_ref(), &options, &image).await;

    let mut frame = tokio::task::spawn_blocking(move || compositor.compose(&image, landmarks))
        .await
        .map_err(|e| MediaError::internal(format!("compose task failed: {}", e)))?;
    frame.detection_error = detection_error;

    info!(
        provider = provider.name(),
        width = frame.image.width(),
        height = frame.image.height(),
        garment_drawn = frame.garment_drawn,
        duration_ms = start.elapsed().as_millis() as u64,
        "Composite rendered"
    );

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_png;
    use crate::detector::FixedPoseProvider;
    use image::{Rgba, RgbaImage};
    use tryon_models::{Keypoint, LandmarkSet, PoseLandmark};

    #[tokio::test]
    async fn test_render_image_end_to_end() {
        let photo = encode_png(&RgbaImage::from_pixel(50, 40, Rgba([1, 2, 3, 255]))).unwrap();
        let mut set = LandmarkSet::empty();
        set.set(PoseLandmark::LeftShoulder, Some(Keypoint::new(0.3, 0.4, 0.9)));
        set.set(PoseLandmark::RightShoulder, Some(Keypoint::new(0.7, 0.4, 0.9)));
        set.set(PoseLandmark::LeftHip, Some(Keypoint::new(0.35, 0.8, 0.9)));
        set.set(PoseLandmark::RightHip, Some(Keypoint::new(0.65, 0.8, 0.9)));

        let compositor = Arc::new(
            Compositor::default().with_garment(RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]))),
        );
        let frame = render_image(
            compositor,
            Arc::new(FixedPoseProvider::new(set)),
            PoseOptions::default(),
            photo,
        )
        .await
        .unwrap();

        assert_eq!(frame.image.dimensions(), (50, 40));
        assert!(frame.garment_drawn);
        assert!(frame.detection_error.is_none());
    }

    #[tokio::test]
    async fn test_render_image_with_extreme_landmark() {
        let photo = encode_png(&RgbaImage::from_pixel(100, 100, Rgba([1, 2, 3, 255]))).unwrap();
        let mut set = LandmarkSet::empty();
        set.set(PoseLandmark::Nose, Some(Keypoint::new(1e12, 0.5, 1.0)));
        set.set(PoseLandmark::LeftEye, Some(Keypoint::new(0.5, 0.5, 1.0)));

        let frame = render_image(
            Arc::new(Compositor::default()),
            Arc::new(FixedPoseProvider::new(set)),
            PoseOptions::default(),
            photo,
        )
        .await
        .unwrap();

        assert_eq!(frame.image.dimensions(), (100, 100));
        assert!(frame.placement.is_none());
        assert_eq!(frame.image.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_render_image_rejects_garbage() {
        let err = render_image(
            Arc::new(Compositor::default()),
            Arc::new(FixedPoseProvider::default()),
            PoseOptions::default(),
            b"definitely not an image".to_vec(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::Decode(_)));
    }
}

//! Overlay compositor.
//!
//! Layers, bottom to top: source photo, skeleton, garment sprite.

use std::path::Path;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tracing::{debug, info, warn};
use tryon_models::{LandmarkSet, PlacementRect};

use crate::error::{MediaError, MediaResult};
use crate::placement::{compute_placement, PlacementConfig};
use crate::skeleton::{draw_skeleton, SkeletonStyle};

/// Garments larger than this multiple of the canvas are not drawn.
const MAX_GARMENT_SCALE: f64 = 4.0;

/// One composited frame.
#[derive(Debug, Clone)]
pub struct CompositeFrame {
    /// Canvas at the source image's native size
    pub image: RgbaImage,
    /// Landmarks the frame was drawn from
    pub landmarks: LandmarkSet,
    /// Garment rectangle, when the torso was found
    pub placement: Option<PlacementRect>,
    /// Whether the garment sprite was drawn
    pub garment_drawn: bool,
    /// Detector failure, if landmarks could not be obtained
    pub detection_error: Option<String>,
}

/// Draws photo, skeleton and garment.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    placement: PlacementConfig,
    skeleton: SkeletonStyle,
    garment: Option<Arc<RgbaImage>>,
}

impl Compositor {
    /// Create a compositor without a garment sprite.
    pub fn new(placement: PlacementConfig, skeleton: SkeletonStyle) -> Self {
        Self {
            placement,
            skeleton,
            garment: None,
        }
    }

    /// Use this sprite as the garment layer.
    pub fn with_garment(mut self, garment: RgbaImage) -> Self {
        self.garment = Some(Arc::new(garment));
        self
    }

    /// Load the garment sprite from disk.
    pub fn load_garment(path: impl AsRef<Path>) -> MediaResult<RgbaImage> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::AssetNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let sprite = crate::codec::decode_image(&bytes)?.to_rgba8();
        info!(
            path = %path.display(),
            width = sprite.width(),
            height = sprite.height(),
            "Garment sprite loaded"
        );
        Ok(sprite)
    }

    pub fn has_garment(&self) -> bool {
        self.garment.is_some()
    }

    pub fn placement_config(&self) -> &PlacementConfig {
        &self.placement
    }

    /// Composite a frame.
    ///
    /// The canvas takes the source image's native dimensions. The skeleton
    /// is drawn when landmarks are present, the garment only when the full
    /// torso is.
    pub fn compose(&self, source: &DynamicImage, landmarks: LandmarkSet) -> CompositeFrame {
        let mut canvas = source.to_rgba8();
        let (width, height) = canvas.dimensions();

        if !landmarks.is_empty() {
            let connectors = draw_skeleton(&mut canvas, &landmarks, &self.skeleton);
            debug!(connectors, "Skeleton drawn");
        }

        let placement = compute_placement(&landmarks, width, height, &self.placement);
        let garment_drawn = match (placement, self.garment.as_deref()) {
            (Some(rect), Some(sprite)) => draw_garment(&mut canvas, sprite, &rect),
            (Some(_), None) => {
                debug!("No garment sprite configured, skipping garment layer");
                false
            }
            (None, _) => false,
        };

        CompositeFrame {
            image: canvas,
            landmarks,
            placement,
            garment_drawn,
            detection_error: None,
        }
    }
}

/// Scale the sprite to `rect` and alpha-blend it onto the canvas.
/// Parts outside the canvas are clipped.
fn draw_garment(canvas: &mut RgbaImage, sprite: &RgbaImage, rect: &PlacementRect) -> bool {
    let (width, height) = canvas.dimensions();
    if !rect.is_drawable() {
        warn!(?rect, "Garment rectangle is not drawable");
        return false;
    }
    if rect.width > width as f64 * MAX_GARMENT_SCALE || rect.height > height as f64 * MAX_GARMENT_SCALE {
        warn!(?rect, width, height, "Garment rectangle far exceeds canvas, skipping");
        return false;
    }

    let target_w = rect.width.round().max(1.0) as u32;
    let target_h = rect.height.round().max(1.0) as u32;
    let scaled = imageops::resize(sprite, target_w, target_h, FilterType::Triangle);
    imageops::overlay(canvas, &scaled, rect.x.round() as i64, rect.y.round() as i64);
    true
}

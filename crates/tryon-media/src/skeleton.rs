//! Skeleton overlay drawing.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use tryon_models::{Keypoint, LandmarkSet, POSE_CONNECTIONS};

/// Skeleton drawing style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonStyle {
    /// Connector and marker color
    pub color: Rgba<u8>,
    /// Connector thickness in pixels
    pub line_width: u32,
    /// Marker radius in pixels
    pub point_radius: i32,
    /// Landmarks below this confidence are not drawn
    pub visibility_min: f64,
}

impl Default for SkeletonStyle {
    fn default() -> Self {
        Self {
            color: Rgba([255, 0, 0, 255]),
            line_width: 2,
            point_radius: 4,
            visibility_min: 0.5,
        }
    }
}

/// Draw skeleton connectors and landmark markers onto the canvas.
///
/// Keypoints outside [`Keypoint::is_in_frame`] are skipped, keeping pixel
/// coordinates well inside `i32`. Returns the number of connectors drawn.
pub fn draw_skeleton(canvas: &mut RgbaImage, landmarks: &LandmarkSet, style: &SkeletonStyle) -> usize {
    let (width, height) = canvas.dimensions();
    let mut drawn = 0;

    for (start, end) in POSE_CONNECTIONS {
        let (Some(a), Some(b)) = (landmarks.get(start), landmarks.get(end)) else {
            continue;
        };
        if !drawable(a, style) || !drawable(b, style) {
            continue;
        }

        let (ax, ay) = a.to_pixel(width, height);
        let (bx, by) = b.to_pixel(width, height);
        draw_thick_line(canvas, (ax as f32, ay as f32), (bx as f32, by as f32), style);
        drawn += 1;
    }

    for (_, point) in landmarks.iter() {
        if !drawable(point, style) {
            continue;
        }
        let (x, y) = point.to_pixel(width, height);
        draw_filled_circle_mut(
            canvas,
            (x.round() as i32, y.round() as i32),
            style.point_radius,
            style.color,
        );
    }

    drawn
}

fn drawable(point: &Keypoint, style: &SkeletonStyle) -> bool {
    point.is_visible(style.visibility_min) && point.is_in_frame()
}

/// Draw `line_width` parallel one-pixel segments offset along the normal.
fn draw_thick_line(canvas: &mut RgbaImage, start: (f32, f32), end: (f32, f32), style: &SkeletonStyle) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt();
    let (nx, ny) = if len > f32::EPSILON {
        (-dy / len, dx / len)
    } else {
        (0.0, 0.0)
    };

    let width = style.line_width.max(1);
    let half = (width as f32 - 1.0) / 2.0;
    for i in 0..width {
        let offset = i as f32 - half;
        draw_line_segment_mut(
            canvas,
            (start.0 + nx * offset, start.1 + ny * offset),
            (end.0 + nx * offset, end.1 + ny * offset),
            style.color,
        );
    }
}

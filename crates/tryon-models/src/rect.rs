use serde::{Deserialize, Serialize};

/// A rectangle in pixel space where the garment sprite is drawn.
///
/// The rectangle may extend past the canvas; drawing clips it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    /// X coordinate of the top-left corner
    pub x: f64,
    /// Y coordinate of the top-left corner
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacementRect {
    /// Create a new placement rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check the rectangle has a drawable, finite size.
    pub fn is_drawable(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 1.0
            && self.height >= 1.0
    }

    /// Center point.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawable() {
        assert!(PlacementRect::new(-10.0, -10.0, 20.0, 20.0).is_drawable());
        assert!(!PlacementRect::new(0.0, 0.0, 0.5, 20.0).is_drawable());
        assert!(!PlacementRect::new(f64::NAN, 0.0, 20.0, 20.0).is_drawable());
        assert_eq!(PlacementRect::new(140.0, 280.0, 720.0, 800.0).center(), (500.0, 680.0));
    }
}

use serde::{Deserialize, Serialize};

/// Pixel-space coordinate. Real-valued so predictions need no rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in pixel coordinates, `(x, y)` being the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn centroid(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// One object observed in one frame. Has no identity across frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub centroid: Point,
}

impl Detection {
    /// Detection with the centroid derived from the box.
    pub fn from_bbox(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            centroid: bbox.centroid(),
        }
    }

    /// Zero-sized detection at a point. Handy when only centroids are known.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            bbox: BoundingBox::new(x, y, 0.0, 0.0),
            centroid: Point::new(x, y),
        }
    }
}

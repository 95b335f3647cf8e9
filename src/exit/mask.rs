use crate::ConfigurationError;

/// Pixel value that marks an exit pixel in byte rasters and mask images.
pub const MARKED: u8 = 255;

/// Largest vertex coordinate magnitude accepted by `from_polygons`.
pub const MAX_VERTEX_COORD: i64 = 1 << 31;

/// Immutable binary raster. `true` pixels belong to an exit region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitMask {
    width: u32,
    height: u32,
    marked: Vec<bool>,
}

impl ExitMask {
    /// Build a mask by asking `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> bool,
    ) -> Result<Self, ConfigurationError> {
        check_dimensions(width, height)?;
        let mut marked = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                marked.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            marked,
        })
    }

    /// Build a mask from a row-major byte raster; `255` marks a pixel.
    pub fn from_marked_bytes(
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> Result<Self, ConfigurationError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if bytes.len() != expected {
            return Err(ConfigurationError::new(
                "exit_mask",
                format!(
                    "raster length mismatch: expected {}, got {}",
                    expected,
                    bytes.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            marked: bytes.iter().map(|&b| b == MARKED).collect(),
        })
    }

    /// Fill polygons into a fresh mask. Pixels on a polygon's edges are
    /// marked too.
    ///
    /// Each polygon is a list of integer vertices `(x, y)` in drawing order;
    /// fewer than three vertices, or a coordinate beyond `MAX_VERTEX_COORD`,
    /// is a configuration error.
    pub fn from_polygons(
        width: u32,
        height: u32,
        polygons: &[Vec<(i64, i64)>],
    ) -> Result<Self, ConfigurationError> {
        check_dimensions(width, height)?;
        let mut marked = vec![false; width as usize * height as usize];
        for polygon in polygons {
            if polygon.len() < 3 {
                return Err(ConfigurationError::new(
                    "exit_mask",
                    format!("polygon needs at least 3 vertices (got {})", polygon.len()),
                ));
            }
            if let Some(&(x, y)) = polygon
                .iter()
                .find(|&&(x, y)| x.unsigned_abs().max(y.unsigned_abs()) > MAX_VERTEX_COORD as u64)
            {
                return Err(ConfigurationError::new(
                    "exit_mask",
                    format!(
                        "polygon vertex ({}, {}) is beyond +/-{}",
                        x, y, MAX_VERTEX_COORD
                    ),
                ));
            }
            fill_polygon(&mut marked, width, height, polygon);
        }
        Ok(Self {
            width,
            height,
            marked,
        })
    }

    /// Load a grayscale mask image; pixels equal to 255 are marked.
    #[cfg(feature = "mask-images")]
    pub fn from_image_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let img = image::open(path)
            .map_err(|e| anyhow::anyhow!("failed to load exit mask {}: {}", path.display(), e))?
            .to_luma8();
        let (width, height) = img.dimensions();
        Ok(Self::from_marked_bytes(width, height, img.as_raw())?)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel under `(x, y)` is marked, or `None` when the point
    /// is off the raster (negative, too large, or not a number).
    pub fn lookup(&self, x: f64, y: f64) -> Option<bool> {
        let px = raster_index(x, self.width)?;
        let py = raster_index(y, self.height)?;
        Some(self.marked[py * self.width as usize + px])
    }

    /// Number of marked pixels.
    pub fn marked_count(&self) -> usize {
        self.marked.iter().filter(|&&m| m).count()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ConfigurationError> {
    if width == 0 || height == 0 {
        return Err(ConfigurationError::new(
            "exit_mask",
            format!("dimensions must be non-zero (got {}x{})", width, height),
        ));
    }
    Ok(())
}

fn raster_index(coord: f64, limit: u32) -> Option<usize> {
    if !coord.is_finite() {
        return None;
    }
    let floored = coord.floor();
    if floored < 0.0 || floored >= limit as f64 {
        return None;
    }
    Some(floored as usize)
}

fn fill_polygon(marked: &mut [bool], width: u32, height: u32, polygon: &[(i64, i64)]) {
    let min_x = polygon.iter().map(|v| v.0).min().unwrap_or(0).max(0);
    let max_x = polygon
        .iter()
        .map(|v| v.0)
        .max()
        .unwrap_or(-1)
        .min(width as i64 - 1);
    let min_y = polygon.iter().map(|v| v.1).min().unwrap_or(0).max(0);
    let max_y = polygon
        .iter()
        .map(|v| v.1)
        .max()
        .unwrap_or(-1)
        .min(height as i64 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if covers(polygon, x, y) {
                marked[y as usize * width as usize + x as usize] = true;
            }
        }
    }
}

/// Boundary-inclusive point-in-polygon test (even-odd rule).
fn covers(polygon: &[(i64, i64)], x: i64, y: i64) -> bool {
    let n = polygon.len();
    let mut inside = false;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if on_segment(a, b, (x, y)) {
            return true;
        }
        if (a.1 > y) != (b.1 > y) {
            let t = (y - a.1) as f64 / (b.1 - a.1) as f64;
            let cross_x = a.0 as f64 + t * (b.0 - a.0) as f64;
            if (x as f64) < cross_x {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_segment(a: (i64, i64), b: (i64, i64), p: (i64, i64)) -> bool {
    // Bounded vertices keep these products well inside i128.
    let (ax, ay, bx, by) = (a.0 as i128, a.1 as i128, b.0 as i128, b.1 as i128);
    let (px, py) = (p.0 as i128, p.1 as i128);
    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    cross == 0
        && p.0 >= a.0.min(b.0)
        && p.0 <= a.0.max(b.0)
        && p.1 >= a.1.min(b.1)
        && p.1 <= a.1.max(b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_polygon_marks_edges_and_interior() {
        let mask =
            ExitMask::from_polygons(100, 10, &[vec![(50, 0), (99, 0), (99, 9), (50, 9)]])
                .expect("mask");

        assert_eq!(mask.marked_count(), 50 * 10);
        assert_eq!(mask.lookup(49.0, 5.0), Some(false));
        assert_eq!(mask.lookup(50.0, 0.0), Some(true));
        assert_eq!(mask.lookup(99.0, 9.0), Some(true));
        assert_eq!(mask.lookup(75.5, 4.2), Some(true));
    }

    #[test]
    fn triangle_polygon_marks_half_plane() {
        let mask = ExitMask::from_polygons(10, 10, &[vec![(0, 0), (9, 0), (0, 9)]]).expect("mask");

        assert_eq!(mask.lookup(0.0, 0.0), Some(true));
        assert_eq!(mask.lookup(4.0, 5.0), Some(true));
        assert_eq!(mask.lookup(9.0, 9.0), Some(false));
        assert_eq!(mask.lookup(6.0, 6.0), Some(false));
    }

    #[test]
    fn polygon_outside_raster_is_clipped() {
        let mask = ExitMask::from_polygons(10, 10, &[vec![(-20, -20), (5, -20), (5, 2), (-20, 2)]])
            .expect("mask");
        assert_eq!(mask.marked_count(), 6 * 3);
    }

    #[test]
    fn far_off_raster_vertices_fill_without_overflow() {
        let far = MAX_VERTEX_COORD;
        let mask = ExitMask::from_polygons(
            10,
            10,
            &[vec![(-far, -far), (far, -far), (far, far), (-far, far)]],
        )
        .expect("mask");
        assert_eq!(mask.marked_count(), 100);

        let mask = ExitMask::from_polygons(10, 10, &[vec![(-far, 0), (far, 0), (0, far)]])
            .expect("mask");
        assert_eq!(mask.lookup(5.0, 0.0), Some(true));
        assert_eq!(mask.lookup(9.0, 9.0), Some(true));
    }

    #[test]
    fn vertex_beyond_limit_is_rejected() {
        let huge = 4_000_000_000;
        let err = ExitMask::from_polygons(
            10,
            10,
            &[vec![(-huge, -huge), (huge, -huge), (huge, huge), (-huge, huge)]],
        )
        .unwrap_err();
        assert_eq!(err.field, "exit_mask");
        assert!(err.message.contains("4000000000"), "{}", err);

        assert!(ExitMask::from_polygons(10, 10, &[vec![(i64::MIN, 0), (0, 0), (0, 5)]]).is_err());
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let err = ExitMask::from_polygons(10, 10, &[vec![(0, 0), (5, 5)]]).unwrap_err();
        assert_eq!(err.field, "exit_mask");
    }

    #[test]
    fn lookup_off_raster_is_none() {
        let mask = ExitMask::from_fn(4, 4, |_, _| false).expect("mask");
        assert_eq!(mask.lookup(-0.5, 1.0), None);
        assert_eq!(mask.lookup(4.0, 1.0), None);
        assert_eq!(mask.lookup(1.0, 4.0), None);
        assert_eq!(mask.lookup(f64::NAN, 1.0), None);
        assert_eq!(mask.lookup(3.99, 3.99), Some(false));
    }

    #[test]
    fn byte_raster_marks_only_full_value() {
        let mask = ExitMask::from_marked_bytes(2, 2, &[0, 255, 254, 255]).expect("mask");
        assert_eq!(mask.lookup(0.0, 0.0), Some(false));
        assert_eq!(mask.lookup(1.0, 0.0), Some(true));
        assert_eq!(mask.lookup(0.0, 1.0), Some(false));
        assert_eq!(mask.lookup(1.0, 1.0), Some(true));

        assert!(ExitMask::from_marked_bytes(2, 2, &[0, 0, 0]).is_err());
    }

    #[test]
    fn zero_sized_mask_is_rejected() {
        assert!(ExitMask::from_fn(0, 10, |_, _| true).is_err());
        assert!(ExitMask::from_polygons(10, 0, &[]).is_err());
    }
}

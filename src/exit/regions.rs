use crate::detect::Point;
use crate::exit::mask::ExitMask;
use crate::ConfigurationError;

/// The exit masks a counter tests points against.
///
/// Masks are fixed at construction and never change during a run.
#[derive(Clone, Debug, Default)]
pub struct ExitRegionSet {
    masks: Vec<ExitMask>,
}

impl ExitRegionSet {
    /// All masks must share one size: they describe the same frame.
    pub fn new(masks: Vec<ExitMask>) -> Result<Self, ConfigurationError> {
        if let Some(first) = masks.first() {
            let (width, height) = (first.width(), first.height());
            if let Some(other) = masks
                .iter()
                .find(|m| m.width() != width || m.height() != height)
            {
                return Err(ConfigurationError::new(
                    "exit_masks",
                    format!(
                        "masks must share dimensions: {}x{} vs {}x{}",
                        width,
                        height,
                        other.width(),
                        other.height()
                    ),
                ));
            }
        }
        Ok(Self { masks })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn masks(&self) -> &[ExitMask] {
        &self.masks
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// True when the point is marked in any mask, or falls off a mask's
    /// raster. With no masks configured nothing is ever an exit.
    pub fn contains(&self, point: Point) -> bool {
        self.masks
            .iter()
            .any(|mask| mask.lookup(point.x, point.y).unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_half(width: u32, height: u32) -> ExitMask {
        ExitMask::from_fn(width, height, |x, _| x >= width / 2).expect("mask")
    }

    #[test]
    fn marked_pixel_is_exit() {
        let set = ExitRegionSet::new(vec![right_half(100, 10)]).expect("set");
        assert!(set.contains(Point::new(50.0, 0.0)));
        assert!(set.contains(Point::new(99.9, 9.9)));
        assert!(!set.contains(Point::new(49.9, 5.0)));
    }

    #[test]
    fn any_mask_suffices() {
        let left = ExitMask::from_fn(100, 10, |x, _| x < 10).expect("mask");
        let set = ExitRegionSet::new(vec![right_half(100, 10), left]).expect("set");
        assert!(set.contains(Point::new(5.0, 5.0)));
        assert!(set.contains(Point::new(60.0, 5.0)));
        assert!(!set.contains(Point::new(30.0, 5.0)));
    }

    #[test]
    fn off_frame_points_count_as_exited() {
        let set = ExitRegionSet::new(vec![ExitMask::from_fn(10, 10, |_, _| false).expect("mask")])
            .expect("set");
        assert!(set.contains(Point::new(-1.0, 5.0)));
        assert!(set.contains(Point::new(5.0, 10.0)));
        assert!(set.contains(Point::new(f64::INFINITY, 0.0)));
        assert!(!set.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn empty_set_never_exits() {
        let set = ExitRegionSet::empty();
        assert!(!set.contains(Point::new(-1000.0, -1000.0)));
        assert!(!set.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let err = ExitRegionSet::new(vec![right_half(100, 10), right_half(100, 20)]).unwrap_err();
        assert_eq!(err.field, "exit_masks");
    }
}

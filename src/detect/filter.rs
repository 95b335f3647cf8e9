use anyhow::Result;

use crate::pipeline::{FrameRecord, Stage, StageDescriptor};

pub const DEFAULT_MIN_WIDTH: f64 = 35.0;
pub const DEFAULT_MIN_HEIGHT: f64 = 35.0;

/// Drops detections whose boxes are too small to be a vehicle.
///
/// Foreground blobs from background subtraction include noise, shadows and
/// fragments; anything narrower than `min_width` or shorter than
/// `min_height` is removed before tracking.
#[derive(Clone, Debug)]
pub struct DetectionFilter {
    min_width: f64,
    min_height: f64,
}

impl DetectionFilter {
    pub fn new(min_width: f64, min_height: f64) -> Self {
        Self {
            min_width,
            min_height,
        }
    }
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WIDTH, DEFAULT_MIN_HEIGHT)
    }
}

impl Stage for DetectionFilter {
    fn descriptor(&self) -> StageDescriptor {
        StageDescriptor {
            name: "detection_filter",
        }
    }

    fn process(&mut self, mut record: FrameRecord) -> Result<FrameRecord> {
        let before = record.detections.len();
        record
            .detections
            .retain(|det| det.bbox.w >= self.min_width && det.bbox.h >= self.min_height);
        log::debug!(
            "frame #{}: {} of {} detections kept",
            record.frame_number,
            record.detections.len(),
            before
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::{BoundingBox, Detection};

    #[test]
    fn drops_boxes_below_minimum_size() -> Result<()> {
        let mut filter = DetectionFilter::default();
        let record = FrameRecord::new(
            0,
            vec![
                Detection::from_bbox(BoundingBox::new(0.0, 0.0, 35.0, 35.0)),
                Detection::from_bbox(BoundingBox::new(0.0, 0.0, 34.0, 80.0)),
                Detection::from_bbox(BoundingBox::new(0.0, 0.0, 80.0, 10.0)),
                Detection::from_bbox(BoundingBox::new(5.0, 5.0, 60.0, 40.0)),
            ],
        );

        let out = filter.process(record)?;
        let widths: Vec<f64> = out.detections.iter().map(|d| d.bbox.w).collect();
        assert_eq!(widths, vec![35.0, 60.0]);
        Ok(())
    }

    #[test]
    fn zero_minimum_keeps_everything() -> Result<()> {
        let mut filter = DetectionFilter::new(0.0, 0.0);
        let record = FrameRecord::new(0, vec![Detection::at(1.0, 1.0)]);
        assert_eq!(filter.process(record)?.detections.len(), 1);
        Ok(())
    }
}

use serde::Serialize;

use crate::detect::Detection;
use crate::track::{Crossing, Trajectory};

/// Shared per-frame record handed from stage to stage.
///
/// `paths` is a snapshot of the counter's live paths: consumers may read or
/// even edit it without touching the counter's own state.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FrameRecord {
    pub frame_number: u64,
    /// The frame's detections, passed through for renderers and reports.
    pub detections: Vec<Detection>,
    pub paths: Vec<Trajectory>,
    pub vehicle_count: u64,
    /// Crossings counted on this frame.
    pub crossings: Vec<Crossing>,
}

impl FrameRecord {
    pub fn new(frame_number: u64, detections: Vec<Detection>) -> Self {
        Self {
            frame_number,
            detections,
            ..Self::default()
        }
    }
}

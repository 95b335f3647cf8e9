use std::collections::VecDeque;

use anyhow::Result;

use crate::detect::result::{BoundingBox, Detection};
use crate::detect::source::DetectionSource;

/// In-memory source that hands out pre-built frames in order.
///
/// Used by tests and by the replay tool's synthetic mode.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Vec<Detection>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Vec<Detection>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Synthetic traffic: vehicles driving down two lanes of a 1280x720 view,
    /// a new vehicle entering every `spacing` frames.
    ///
    /// Boxes are 40x40 so they pass the default size filter.
    pub fn synthetic_lanes(frame_count: usize, spacing: usize) -> Self {
        const LANES: [f64; 2] = [380.0, 900.0];
        const SPEED: f64 = 12.0;
        const SIZE: f64 = 40.0;
        const HEIGHT: f64 = 720.0;

        let spacing = spacing.max(1);
        let mut frames = Vec::with_capacity(frame_count);
        for frame in 0..frame_count {
            let mut detections = Vec::new();
            for (lane_index, lane_x) in LANES.iter().enumerate() {
                // Lanes are offset so vehicles do not enter in lockstep.
                let offset = lane_index * spacing / 2;
                let mut spawn = offset;
                while spawn <= frame {
                    let y = (frame - spawn) as f64 * SPEED;
                    if y + SIZE < HEIGHT {
                        detections.push(Detection::from_bbox(BoundingBox::new(
                            *lane_x, y, SIZE, SIZE,
                        )));
                    }
                    spawn += spacing;
                }
            }
            frames.push(detections);
        }
        Self::new(frames)
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl DetectionSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>> {
        Ok(self.frames.pop_front())
    }
}

//! JSON-lines detection replay.
//!
//! Each line holds one frame:
//!
//! ```text
//! {"detections": [[x, y, w, h], [x, y, w, h]]}
//! ```
//!
//! Blank lines are frames without detections. Centroids are derived from the
//! boxes, so recorded detector output can be replayed through the tracker
//! without the video.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::detect::result::{BoundingBox, Detection};
use crate::detect::source::DetectionSource;

#[derive(Debug, Deserialize)]
struct ReplayFrame {
    #[serde(default)]
    detections: Vec<[f64; 4]>,
}

/// Statistics for a replay source.
#[derive(Clone, Debug)]
pub struct ReplayStats {
    pub frames_read: u64,
    pub detections_read: u64,
    pub label: String,
}

pub struct ReplaySource {
    reader: Box<dyn BufRead>,
    label: String,
    line_no: u64,
    frames_read: u64,
    detections_read: u64,
}

impl ReplaySource {
    /// Open a local JSON-lines file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| anyhow!("failed to open detections file {}: {}", path.display(), e))?;
        log::info!("ReplaySource: reading {}", path.display());
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }

    pub fn from_reader(reader: impl BufRead + 'static, label: impl Into<String>) -> Self {
        Self {
            reader: Box::new(reader),
            label: label.into(),
            line_no: 0,
            frames_read: 0,
            detections_read: 0,
        }
    }

    pub fn stats(&self) -> ReplayStats {
        ReplayStats {
            frames_read: self.frames_read,
            detections_read: self.detections_read,
            label: self.label.clone(),
        }
    }

    fn parse_line(&self, line: &str) -> Result<Vec<Detection>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let frame: ReplayFrame = serde_json::from_str(trimmed).map_err(|e| {
            anyhow!(
                "invalid detections at {}:{}: {}",
                self.label,
                self.line_no,
                e
            )
        })?;
        Ok(frame
            .detections
            .into_iter()
            .map(|[x, y, w, h]| Detection::from_bbox(BoundingBox::new(x, y, w, h)))
            .collect())
    }
}

impl DetectionSource for ReplaySource {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| anyhow!("failed to read {}: {}", self.label, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let detections = self.parse_line(&line)?;
        self.frames_read += 1;
        self.detections_read += detections.len() as u64;
        Ok(Some(detections))
    }
}

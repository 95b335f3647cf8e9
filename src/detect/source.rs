use anyhow::Result;

use crate::detect::result::Detection;

/// Producer of per-frame detections.
///
/// The tracker does not care how boxes are found (background subtraction,
/// contour extraction, a neural detector). Sources only hand over the boxes,
/// one frame at a time and in a stable order.
pub trait DetectionSource {
    /// Source identifier for logs.
    fn name(&self) -> &'static str;

    /// Detections for the next frame, or `None` once the source is exhausted.
    ///
    /// An empty vector is a valid frame with nothing in it.
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

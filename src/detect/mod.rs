mod filter;
mod result;
mod source;
mod sources;

pub use filter::{DetectionFilter, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH};
pub use result::{BoundingBox, Detection, Point};
pub use source::DetectionSource;
pub use sources::{ReplaySource, ReplayStats, ScriptedSource};

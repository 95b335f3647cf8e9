//! Sequential per-frame pipeline.
//!
//! A `PipelineRunner` threads one `FrameRecord` through its stages in
//! registration order. Stages implement `Stage`, so the `process`
//! capability is checked by the compiler; registration checks the rest of
//! the descriptor.
//!
//! Runs are strictly frame-sequential: a frame's record leaves the last stage
//! before the next frame enters the first.

mod record;
mod runner;

pub use record::FrameRecord;
pub use runner::{validate_stage_name, PipelineRunner, Stage, StageDescriptor};

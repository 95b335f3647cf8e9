//! Exit regions.
//!
//! An exit region is a set of marked pixels in image space. A path whose last
//! step moves from an unmarked pixel onto a marked one has left the scene
//! through an exit and may be counted.
//!
//! - `ExitMask`: one immutable binary raster.
//! - `ExitRegionSet`: the masks the counter tests against, all of one size.
//!
//! Points off the raster count as exited: vehicles that leave the frame
//! without touching a drawn exit must not keep their paths alive forever.

mod mask;
mod regions;

pub use mask::ExitMask;
pub use regions::ExitRegionSet;

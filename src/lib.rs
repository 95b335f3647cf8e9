//! Vehicle Counter
//!
//! This crate implements path tracking and exit-zone crossing counting for
//! fixed-camera traffic video.
//!
//! # Architecture
//!
//! Each frame flows through an ordered pipeline of stages sharing one
//! `FrameRecord`:
//!
//! 1. **Detections in**: an external detector (or a `DetectionSource`) places
//!    the frame's bounding boxes in the record.
//! 2. **Filtering**: `DetectionFilter` drops boxes below the minimum size.
//! 3. **Tracking & counting**: `VehicleCounter` links detections into paths
//!    by greedy nearest-neighbour matching against a constant-velocity
//!    prediction, and counts paths whose last step enters an exit mask.
//! 4. **Consumers**: renderers and report writers read the record.
//!
//! The counter owns its paths. Consumers only ever see read-only slices or
//! the snapshot copied into the record.
//!
//! # Module Structure
//!
//! - `detect`: Points, bounding boxes, detections and detection sources
//! - `exit`: Exit masks and the exit test
//! - `track`: Paths and the `VehicleCounter` engine
//! - `pipeline`: `Stage` trait, `FrameRecord`, `PipelineRunner`
//! - `config`: File + environment configuration for the binaries

pub mod config;
pub mod detect;
pub mod exit;
pub mod pipeline;
pub mod track;

pub use config::TrackingConfig;
pub use detect::{
    BoundingBox, Detection, DetectionFilter, DetectionSource, Point, ReplaySource,
    ScriptedSource,
};
pub use exit::{ExitMask, ExitRegionSet};
pub use pipeline::{FrameRecord, PipelineRunner, Stage, StageDescriptor};
pub use track::{CounterSettings, Crossing, Trajectory, VehicleCounter};

// -------------------- Configuration Errors --------------------

/// Raised when a component is constructed or registered with unusable settings.
///
/// Converts into `anyhow::Error`; callers that need to tell configuration
/// problems apart from I/O failures can `downcast_ref::<ConfigurationError>()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigurationError {
    pub field: &'static str,
    pub message: String,
}

impl ConfigurationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigurationError {}

/// Rejects zero, negative and non-finite values for a real-valued setting.
pub(crate) fn require_positive(
    field: &'static str,
    value: f64,
) -> Result<f64, ConfigurationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigurationError::new(
            field,
            format!("must be a finite value > 0 (got {})", value),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display_names_field() {
        let err = ConfigurationError::new("path_size", "must be > 0");
        assert_eq!(err.to_string(), "configuration: path_size: must be > 0");
    }

    #[test]
    fn require_positive_rejects_zero_negative_and_nan() {
        assert!(require_positive("x_weight", 0.0).is_err());
        assert!(require_positive("x_weight", -1.0).is_err());
        assert!(require_positive("x_weight", f64::NAN).is_err());
        assert!(require_positive("x_weight", f64::INFINITY).is_err());
        assert_eq!(require_positive("x_weight", 2.5), Ok(2.5));
    }

    #[test]
    fn configuration_error_survives_anyhow_round_trip() {
        let err: anyhow::Error = ConfigurationError::new("stage", "bad name").into();
        let cfg = err.downcast_ref::<ConfigurationError>().expect("typed error");
        assert_eq!(cfg.field, "stage");
    }
}

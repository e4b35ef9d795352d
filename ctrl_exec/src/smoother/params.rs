//! Trajectory smoother parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::params::{check_non_negative, check_positive, ParamsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory smoothing
#[derive(Deserialize, Debug, Clone)]
pub struct TrajectorySmootherConfig {
    /// Lateral bound given to every anchor point.
    ///
    /// Units: meters
    pub max_lateral_boundary_bound: f64,

    /// Longitudinal bound given to every anchor point.
    ///
    /// Units: meters
    pub longitudinal_boundary_bound: f64,

    /// Fraction of the distance to the neighbours' midpoint a point moves in one relaxation pass.
    /// Must be in (0, 1].
    pub smoothing_weight: f64,

    /// Number of relaxation passes.
    pub max_iterations: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectorySmootherConfig {
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_non_negative("max_lateral_boundary_bound", self.max_lateral_boundary_bound)?;
        check_non_negative("longitudinal_boundary_bound", self.longitudinal_boundary_bound)?;
        check_positive("smoothing_weight", self.smoothing_weight)?;

        if self.smoothing_weight > 1.0 {
            return Err(ParamsError::OutOfRange {
                name: "smoothing_weight",
                value: self.smoothing_weight,
                expected: "a value in (0, 1]",
            });
        }

        Ok(())
    }
}

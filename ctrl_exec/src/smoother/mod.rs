//! # Trajectory smoothing
//!
//! A smoother takes the raw trajectory from planning along with its anchor points and produces a
//! smoothed trajectory. Any implementation must satisfy two requirements:
//!
//! - it is deterministic, the same anchors and trajectory always produce the same output, and
//! - the output passes exactly through every enforced anchor point.
//!
//! A failed smoothing is never replaced by the raw trajectory, the error is returned to the
//! caller which must abort the control cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod discrete;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::AdcTrajectory;

use crate::anchor::AnchorPoint;

pub use discrete::DiscretePointsSmoother;
pub use params::TrajectorySmootherConfig;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait TrajectorySmoother: Send {
    /// Smooth the raw trajectory subject to the given anchor points, which must be one per point
    /// of the raw trajectory.
    fn smooth(
        &mut self,
        anchor_points: &[AnchorPoint],
        raw_trajectory: &AdcTrajectory,
    ) -> Result<AdcTrajectory, SmootherError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum SmootherError {
    #[error("Got {anchors} anchor points for a trajectory of {points} points")]
    AnchorMismatch { anchors: usize, points: usize },

    #[error("At least 2 anchor points are required, got {0}")]
    TooFewAnchors(usize),

    #[error("Non-finite coordinate at point {0}")]
    NonFinite(usize),
}

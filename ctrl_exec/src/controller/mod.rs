//! # Controllers module
//!
//! A controller maps the vehicle's state and the target trajectory onto a raw steering command.
//! The command's `steering_target` is always expressed on the internal [-100, 100] scale,
//! converting it to a physical angle is the job of the caller.
//!
//! The controller to run is chosen from the parameters by [`ControllerType`]. Each variant of
//! the enum carries that controller's parameters, and [`ControllerType::build`] produces a boxed
//! [`Controller`] so that the owner does not need to know which variant is active.
//!
//! Available controllers:
//!
//! - `LatPid` - a pair of PID controllers on the lateral and heading errors to the closest
//!   segment of the trajectory, see [`LatPidController`].
//! - `Stanley` - the Stanley geometric path tracking law, see [`StanleyController`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod lat_pid;
mod segment;
mod stanley;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use comms_if::msg::{AdcTrajectory, Chassis, ControlCommand, LocalizationEstimate};
use crate::params::ParamsError;

pub use lat_pid::{LatPidController, LatPidParams, PidController};
pub use segment::RefSegment;
pub use stanley::{StanleyController, StanleyParams};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Full scale of the steering target, in either direction.
pub const STEERING_TARGET_FULL_SCALE: f64 = 100.0;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A strategy computing the steering command for one control cycle.
pub trait Controller: Send {
    /// Name of the controller, used in logs and debug output.
    fn name(&self) -> &'static str;

    /// Compute the command for the current vehicle state and trajectory.
    fn compute_control_command(
        &mut self,
        localization: &LocalizationEstimate,
        chassis: &Chassis,
        trajectory: &AdcTrajectory,
    ) -> Result<ControlCommand, ControllerError>;

    /// Discard all state accumulated over previous cycles, returning the controller to the state
    /// it had straight after being built.
    fn reset(&mut self) -> Result<(), ControllerError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The controller variants which can be selected in the parameters.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ControllerType {
    LatPid(LatPidParams),
    Stanley(StanleyParams),
}

/// Errors that can occur in a controller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ControllerError {
    #[error("Invalid controller parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("The trajectory has {0} point(s), at least 2 are required")]
    TooFewPoints(usize),

    #[error("The trajectory has no segment of non-zero length")]
    DegenerateTrajectory,

    #[error("The {0} contains non-finite values")]
    NonFinite(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControllerType {
    /// Name of the controller this variant builds.
    pub fn name(&self) -> &'static str {
        match self {
            ControllerType::LatPid(_) => lat_pid::NAME,
            ControllerType::Stanley(_) => stanley::NAME,
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        match self {
            ControllerType::LatPid(p) => p.validate(),
            ControllerType::Stanley(p) => p.validate(),
        }
    }

    /// Build a new instance of the selected controller.
    pub fn build(&self) -> Result<Box<dyn Controller>, ControllerError> {
        self.validate().map_err(ControllerError::InvalidParams)?;

        Ok(match self {
            ControllerType::LatPid(p) => Box::new(LatPidController::new(p.clone())),
            ControllerType::Stanley(p) => Box::new(StanleyController::new(p.clone())),
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use comms_if::msg::{Header, PathPoint, Pose, TrajectoryPoint};

    /// A straight trajectory along LM_X, one point per meter, stamped at `stamp_s`.
    pub(crate) fn straight_trajectory(num_points: usize, stamp_s: f64) -> AdcTrajectory {
        AdcTrajectory {
            header: Header::new(stamp_s),
            trajectory_point: (0..num_points)
                .map(|i| TrajectoryPoint {
                    path_point: PathPoint {
                        s_m: i as f64,
                        ..PathPoint::new(i as f64, 0.0)
                    },
                    v_ms: 2.0,
                    ..Default::default()
                })
                .collect(),
        }
    }

    /// A localization at the given position and heading.
    pub(crate) fn localization_at(x_m: f64, y_m: f64, heading_rad: f64, stamp_s: f64) -> LocalizationEstimate {
        LocalizationEstimate {
            header: Header::new(stamp_s),
            pose: Pose {
                position_m: [x_m, y_m, 0.0],
                heading_rad,
                linear_velocity_ms: 2.0,
                angular_velocity_rads: 0.0,
            },
        }
    }

    #[test]
    fn test_build_variants() {
        let lat_pid = ControllerType::LatPid(LatPidParams {
            lat_k_p: 10.0,
            lat_k_i: 0.0,
            lat_k_d: 0.0,
            head_k_p: 10.0,
            head_k_i: 0.0,
            head_k_d: 0.0,
        });
        assert_eq!(lat_pid.build().unwrap().name(), "LatPid");
        assert_eq!(lat_pid.name(), "LatPid");

        let stanley = ControllerType::Stanley(StanleyParams {
            gain: 1.0,
            softening_speed_ms: 1.0,
            max_steer_angle_rad: 0.5,
        });
        assert_eq!(stanley.build().unwrap().name(), "Stanley");

        let invalid = ControllerType::Stanley(StanleyParams {
            gain: 1.0,
            softening_speed_ms: 0.0,
            max_steer_angle_rad: 0.5,
        });
        assert!(matches!(invalid.build(), Err(ControllerError::InvalidParams(_))));
    }
}

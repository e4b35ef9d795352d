//! # Lateral PID controller
//!
//! Keeps the vehicle on the trajectory using a pair of PID controllers operating on the lateral
//! error and heading error to the closest trajectory segment.
//!
//! The lateral error is the distance between the vehicle's current location and the line through
//! the segment, i.e. how far off the segment we are. The heading error is the difference between
//! the heading of the segment and the vehicle's heading. Each controller outputs a steering
//! demand in percent of full scale, the heading demand minus the lateral demand is then saturated
//! to give the steering target.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use comms_if::msg::{
    AdcTrajectory, Chassis, ControlCommand, Header, LateralDebug, LocalizationEstimate,
};
use util::maths::clamp;

use super::{Controller, ControllerError, RefSegment, STEERING_TARGET_FULL_SCALE};
use crate::params::{check_non_negative, ParamsError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub(super) const NAME: &str = "LatPid";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the lateral PID controller
///
/// Gains on the lateral error are in percent of full steering per meter, gains on the heading
/// error in percent of full steering per radian.
#[derive(Deserialize, Debug, Clone)]
pub struct LatPidParams {
    /// Lateral controller proportional gain
    pub lat_k_p: f64,

    /// Lateral controller integral gain
    pub lat_k_i: f64,

    /// Lateral controller derivative gain
    pub lat_k_d: f64,

    /// Heading controller proportional gain
    pub head_k_p: f64,

    /// Heading controller integral gain
    pub head_k_i: f64,

    /// Heading controller derivative gain
    pub head_k_d: f64,
}

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// The lateral and heading controllers
#[derive(Debug, Clone)]
pub struct LatPidController {
    params: LatPidParams,

    /// Lateral error controller
    lat_ctrl: PidController,

    /// Heading error controller
    head_ctrl: PidController,

    /// Timestamp of the localization used in the previous cycle
    prev_timestamp_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LatPidParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_non_negative("lat_k_p", self.lat_k_p)?;
        check_non_negative("lat_k_i", self.lat_k_i)?;
        check_non_negative("lat_k_d", self.lat_k_d)?;
        check_non_negative("head_k_p", self.head_k_p)?;
        check_non_negative("head_k_i", self.head_k_i)?;
        check_non_negative("head_k_d", self.head_k_d)
    }
}

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            integral: 0f64,
            prev_error: None,
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// `dt_s` is the time since the previous call, or `None` if unknown.
    pub fn get(&mut self, error: f64, dt_s: Option<f64>) -> f64 {
        // Without a time step the integral is left alone, adding the raw error
        // would give a spike on the first cycle after a reset.
        self.integral += match dt_s {
            Some(t) => error * t,
            None => 0f64,
        };

        // Likewise the derivative needs both a previous error and a time step
        let deriv = match (self.prev_error, dt_s) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64,
        };

        self.prev_error = Some(error);

        self.k_p * error + self.k_i * self.integral + self.k_d * deriv
    }

    /// Clear the integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }
}

impl LatPidController {
    /// Create a new instance of the controllers from the parameters
    pub fn new(params: LatPidParams) -> Self {
        Self {
            lat_ctrl: PidController::new(params.lat_k_p, params.lat_k_i, params.lat_k_d),
            head_ctrl: PidController::new(params.head_k_p, params.head_k_i, params.head_k_d),
            params,
            prev_timestamp_s: None,
        }
    }

    pub fn params(&self) -> &LatPidParams {
        &self.params
    }
}

impl Controller for LatPidController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute_control_command(
        &mut self,
        localization: &LocalizationEstimate,
        _chassis: &Chassis,
        trajectory: &AdcTrajectory,
    ) -> Result<ControlCommand, ControllerError> {
        if trajectory.num_points() < 2 {
            return Err(ControllerError::TooFewPoints(trajectory.num_points()));
        }
        if !localization.pose.is_finite() {
            return Err(ControllerError::NonFinite("localization"));
        }

        let pose = &localization.pose;
        let position_m = Vector2::from(pose.position2());

        let segment = RefSegment::closest(trajectory, &position_m)
            .ok_or(ControllerError::DegenerateTrajectory)?;

        let lat_err_m = segment.lateral_error(&position_m);
        let head_err_rad = segment.heading_error(pose.heading_rad);

        // Time since the last cycle, only if it moved forwards
        let timestamp_s = localization.header.timestamp_s;
        let dt_s = match self.prev_timestamp_s {
            Some(t0) if timestamp_s > t0 => Some(timestamp_s - t0),
            _ => None,
        };
        self.prev_timestamp_s = Some(timestamp_s);

        // Being to the left of the path needs a right (negative) steer, a path heading to the
        // left needs a left (positive) steer.
        let demand = self.head_ctrl.get(head_err_rad, dt_s) - self.lat_ctrl.get(lat_err_m, dt_s);

        if !demand.is_finite() {
            return Err(ControllerError::NonFinite("steering demand"));
        }

        Ok(ControlCommand {
            header: Header::new(timestamp_s),
            steering_target: clamp(
                &demand,
                &-STEERING_TARGET_FULL_SCALE,
                &STEERING_TARGET_FULL_SCALE,
            ),
            debug: LateralDebug {
                controller: String::from(NAME),
                lateral_error_m: lat_err_m,
                heading_error_rad: head_err_rad,
                ref_point_index: segment.start_index,
            },
        })
    }

    fn reset(&mut self) -> Result<(), ControllerError> {
        self.lat_ctrl.reset();
        self.head_ctrl.reset();
        self.prev_timestamp_s = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::controller::test::{localization_at, straight_trajectory};

    fn params() -> LatPidParams {
        LatPidParams {
            lat_k_p: 40.0,
            lat_k_i: 10.0,
            lat_k_d: 0.0,
            head_k_p: 80.0,
            head_k_i: 0.0,
            head_k_d: 0.0,
        }
    }

    #[test]
    fn test_pid() {
        let mut pid = PidController::new(1.0, 2.0, 3.0);

        // First call has no history
        assert_eq!(pid.get(1.0, None), 1.0);

        // integral = 0.5 * 0.5, derivative = (0.5 - 1.0) / 0.5
        assert_eq!(pid.get(0.5, Some(0.5)), 0.5 + 2.0 * 0.25 + 3.0 * -1.0);

        pid.reset();
        assert_eq!(pid.get(1.0, Some(0.5)), 1.0 + 2.0 * 0.5);
    }

    #[test]
    fn test_steering_direction() {
        let traj = straight_trajectory(5, 0.0);
        let chassis = Chassis::default();
        let mut ctrl = LatPidController::new(params());

        // Left of the path, aligned: steer right
        let cmd = ctrl
            .compute_control_command(&localization_at(1.5, 0.5, 0.0, 0.0), &chassis, &traj)
            .unwrap();
        assert!((cmd.steering_target + 20.0).abs() < 1e-9);
        assert!((cmd.debug.lateral_error_m - 0.5).abs() < 1e-12);
        assert_eq!(cmd.debug.ref_point_index, 1);
        assert_eq!(cmd.debug.controller, "LatPid");

        ctrl.reset().unwrap();

        // On the path, pointing right of it: steer left
        let cmd = ctrl
            .compute_control_command(&localization_at(1.5, 0.0, -0.1, 0.0), &chassis, &traj)
            .unwrap();
        assert!((cmd.steering_target - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_saturation_and_integral() {
        let traj = straight_trajectory(5, 0.0);
        let chassis = Chassis::default();
        let mut ctrl = LatPidController::new(params());

        let cmd = ctrl
            .compute_control_command(&localization_at(1.5, -10.0, 0.0, 0.0), &chassis, &traj)
            .unwrap();
        assert_eq!(cmd.steering_target, 100.0);

        // Integral builds up on the second cycle
        let first = ctrl
            .compute_control_command(&localization_at(1.5, 0.1, 0.0, 1.0), &chassis, &traj)
            .unwrap();
        let second = ctrl
            .compute_control_command(&localization_at(1.5, 0.1, 0.0, 2.0), &chassis, &traj)
            .unwrap();
        assert!(second.steering_target < first.steering_target);

        // After reset the history is gone
        ctrl.reset().unwrap();
        let after_reset = ctrl
            .compute_control_command(&localization_at(1.5, 0.1, 0.0, 3.0), &chassis, &traj)
            .unwrap();
        assert!((after_reset.steering_target + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_errors() {
        let chassis = Chassis::default();
        let mut ctrl = LatPidController::new(params());

        assert!(matches!(
            ctrl.compute_control_command(
                &localization_at(0.0, 0.0, 0.0, 0.0),
                &chassis,
                &straight_trajectory(1, 0.0)
            ),
            Err(ControllerError::TooFewPoints(1))
        ));

        assert!(matches!(
            ctrl.compute_control_command(
                &localization_at(f64::NAN, 0.0, 0.0, 0.0),
                &chassis,
                &straight_trajectory(3, 0.0)
            ),
            Err(ControllerError::NonFinite(_))
        ));
    }
}

//! # Stanley controller
//!
//! Geometric path tracking law, the steering angle is the heading error plus a correction which
//! turns the vehicle back onto the path:
//!
//! `delta = heading_error + atan2(-gain * lateral_error, softening_speed + |speed|)`
//!
//! The softening speed keeps the correction bounded when the vehicle is slow. The angle is then
//! expressed as a percentage of the maximum steer angle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Deserialize;

use comms_if::msg::{
    AdcTrajectory, Chassis, ControlCommand, Header, LateralDebug, LocalizationEstimate,
};
use util::maths::clamp;

use super::{Controller, ControllerError, RefSegment, STEERING_TARGET_FULL_SCALE};
use crate::params::{check_non_negative, check_positive, ParamsError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub(super) const NAME: &str = "Stanley";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct StanleyParams {
    /// Gain on the lateral error
    pub gain: f64,

    /// Speed added to the vehicle speed in the correction term
    pub softening_speed_ms: f64,

    /// Steer angle corresponding to a steering target of 100
    pub max_steer_angle_rad: f64,
}

#[derive(Debug, Clone)]
pub struct StanleyController {
    params: StanleyParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StanleyParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_non_negative("gain", self.gain)?;
        check_positive("softening_speed_ms", self.softening_speed_ms)?;
        check_positive("max_steer_angle_rad", self.max_steer_angle_rad)
    }
}

impl StanleyController {
    pub fn new(params: StanleyParams) -> Self {
        Self { params }
    }
}

impl Controller for StanleyController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compute_control_command(
        &mut self,
        localization: &LocalizationEstimate,
        chassis: &Chassis,
        trajectory: &AdcTrajectory,
    ) -> Result<ControlCommand, ControllerError> {
        if trajectory.num_points() < 2 {
            return Err(ControllerError::TooFewPoints(trajectory.num_points()));
        }
        if !localization.pose.is_finite() {
            return Err(ControllerError::NonFinite("localization"));
        }
        if !chassis.speed_ms.is_finite() {
            return Err(ControllerError::NonFinite("chassis"));
        }

        let pose = &localization.pose;
        let position_m = Vector2::from(pose.position2());

        let segment = RefSegment::closest(trajectory, &position_m)
            .ok_or(ControllerError::DegenerateTrajectory)?;

        let lat_err_m = segment.lateral_error(&position_m);
        let head_err_rad = segment.heading_error(pose.heading_rad);

        let correction_rad = (-self.params.gain * lat_err_m)
            .atan2(self.params.softening_speed_ms + chassis.speed_ms.abs());
        let steer_rad = head_err_rad + correction_rad;

        let target = steer_rad / self.params.max_steer_angle_rad * STEERING_TARGET_FULL_SCALE;

        Ok(ControlCommand {
            header: Header::new(localization.header.timestamp_s),
            steering_target: clamp(
                &target,
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

    // Stateless
    fn reset(&mut self) -> Result<(), ControllerError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

//! Control command message

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Output of a controller for one control cycle.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub header: Header,

    /// Steering demand on the internal [-100, 100] scale, positive to the
    /// left. Must be scaled by the vehicle's maximum steer angle before being
    /// sent to the actuators.
    pub steering_target: f64,

    pub debug: LateralDebug,
}

/// Monitoring quantities reported by lateral controllers.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateralDebug {
    /// Name of the controller which produced the command.
    pub controller: String,

    /// Signed distance from the reference path, positive when the vehicle is
    /// to the left of it.
    ///
    /// Units: meters
    pub lateral_error_m: f64,

    /// Path heading minus vehicle heading, wrapped to (-pi, pi].
    ///
    /// Units: radians
    pub heading_error_rad: f64,

    /// Index of the trajectory point which starts the reference segment.
    pub ref_point_index: usize,
}

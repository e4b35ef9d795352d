//! # Navigation stack bridge messages
//!
//! These are the messages as the navigation stack publishes them. They are
//! translated into the [`crate::msg`] types by the control executable's
//! adapter, so nothing in this module is used by the pipeline directly.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pose solution from the GNSS/INS unit.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GnssPose {
    pub stamp_s: f64,
    pub x_m: f64,
    pub y_m: f64,
    #[serde(default)]
    pub z_m: f64,
    pub yaw_rad: f64,
}

/// Body motion measured by the IMU and wheel odometry.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleMotion {
    pub stamp_s: f64,
    pub speed_ms: f64,
    pub yaw_rate_rads: f64,
}

/// Feedback from the steering and drive-by-wire controller.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteerFeedback {
    pub stamp_s: f64,
    pub speed_ms: f64,

    /// Measured steering position on the [-100, 100] scale.
    pub steer_pct: f64,

    /// True if the drive-by-wire system is accepting autonomous commands.
    pub auto_enabled: bool,

    /// True if the emergency stop is engaged.
    #[serde(default)]
    pub estop: bool,
}

/// A path point as published by the planner.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedPoint {
    pub x_m: f64,
    pub y_m: f64,
    pub speed_ms: f64,
}

/// The local path published by the planner.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedPath {
    pub stamp_s: f64,

    /// Time between consecutive points.
    ///
    /// Units: seconds
    #[serde(default)]
    pub point_dt_s: f64,

    pub points: Vec<PlannedPoint>,
}

/// One recorded control cycle worth of bridge messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// The control cycle time at which the frame was recorded.
    pub now_s: f64,
    pub pose: GnssPose,
    pub motion: VehicleMotion,
    pub feedback: SteerFeedback,
    pub path: PlannedPath,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a replay file, a JSON array of [`ReplayFrame`]s.
pub fn parse_replay(json: &str) -> Result<Vec<ReplayFrame>, serde_json::Error> {
    serde_json::from_str(json)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

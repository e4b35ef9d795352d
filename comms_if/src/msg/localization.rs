//! Localisation estimate message

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The estimated state of the vehicle in the local map frame.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationEstimate {
    pub header: Header,

    pub pose: Pose,
}

/// Pose and motion of the vehicle body.
///
/// Frame: Local Map (LM), X east, Y north, Z up.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the vehicle reference point (rear axle centre).
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// Heading, the angle of the vehicle's forward axis to LM_X following the
    /// right hand rule about LM_Z.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Forward speed over ground.
    ///
    /// Units: meters/second
    pub linear_velocity_ms: f64,

    /// Yaw rate about LM_Z.
    ///
    /// Units: radians/second
    pub angular_velocity_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Pose {
    /// Position projected onto the XY plane.
    pub fn position2(&self) -> [f64; 2] {
        [self.position_m[0], self.position_m[1]]
    }

    /// Returns true if every field of the pose is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position_m.iter().all(|p| p.is_finite())
            && self.heading_rad.is_finite()
            && self.linear_velocity_ms.is_finite()
            && self.angular_velocity_rads.is_finite()
    }
}

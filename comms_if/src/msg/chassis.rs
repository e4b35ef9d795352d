//! Chassis feedback message

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Kinematic state reported by the vehicle chassis.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chassis {
    pub header: Header,

    /// Vehicle speed measured at the wheels.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Current steering position on the internal [-100, 100] scale.
    pub steering_percentage: f64,

    pub driving_mode: DrivingMode,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Who is currently in charge of the actuators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrivingMode {
    /// A human driver is in control, commands are ignored by the vehicle.
    Manual,

    /// Steering, throttle and brake are all under autonomous control.
    CompleteAuto,

    /// The vehicle has entered its emergency mode.
    EmergencyMode,
}

impl Default for DrivingMode {
    fn default() -> Self {
        DrivingMode::Manual
    }
}

//! # Local view
//!
//! The aggregate of all inputs for the current control cycle. It is owned by the
//! [`crate::interface::ControllerInterface`] and rebuilt in place every cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::{AdcTrajectory, Chassis, LocalizationEstimate};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Inputs of the current control cycle. A `None` field has not been provided (or could not be
/// translated) this cycle.
#[derive(Debug, Default, Clone)]
pub struct LocalView {
    pub localization: Option<LocalizationEstimate>,
    pub chassis: Option<Chassis>,
    pub trajectory: Option<AdcTrajectory>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl LocalView {
    /// Unset all inputs, ready for the next cycle.
    pub fn clear(&mut self) {
        self.localization = None;
        self.chassis = None;
        self.trajectory = None;
    }
}

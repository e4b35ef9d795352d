//! # Control messages
//!
//! These are the internal representations of the pipeline's inputs and
//! outputs. Upstream message families are translated into them by an adapter
//! before each control cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod chassis;
mod control;
mod localization;
mod planning;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use chassis::*;
pub use control::*;
pub use localization::*;
pub use planning::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Common header carried by every message.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Time at which the message content was valid.
    ///
    /// Units: seconds, on the same clock as the control cycle time.
    pub timestamp_s: f64,

    /// Sequence number of the message, increasing by one per publication. Zero for messages whose
    /// producer does not number them.
    #[serde(default)]
    pub sequence_num: u32,
}

impl Header {
    pub fn new(timestamp_s: f64) -> Self {
        Self {
            timestamp_s,
            sequence_num: 0,
        }
    }
}

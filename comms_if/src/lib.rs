//! # Communications interface crate.
//!
//! Provides the message definitions exchanged between the control pipeline
//! and the rest of the vehicle software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Internal message definitions consumed and produced by the control pipeline
pub mod msg;

/// Messages published by the navigation stack, as received over the wire
pub mod bridge;

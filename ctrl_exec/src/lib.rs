//! # Control library.
//!
//! This library turns the per-cycle outputs of localisation, the chassis and planning into a
//! single validated, smoothed and scaled steering command. The executable in this crate drives it
//! at a fixed rate, other crates in the workspace can use it directly.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Adapters - translate upstream message families into the internal messages
pub mod adapter;

/// Controller agent - owns the active controller and its lifecycle
pub mod agent;

/// Anchor points - trajectory points annotated with the bounds the smoother must respect
pub mod anchor;

/// Controllers - strategies mapping vehicle state and trajectory to a raw steering command
pub mod controller;

/// Controller interface - the per-cycle control pipeline
pub mod interface;

/// Local view - the inputs of the current control cycle
pub mod local_view;

/// Parameters of the whole control executable
pub mod params;

/// Replay sources - recorded or synthesised input frames for the executable
pub mod replay;

/// Trajectory smoothing
pub mod smoother;

/// Input validation - completeness and freshness checks
pub mod validator;

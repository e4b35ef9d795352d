//! # Controller interface
//!
//! Top level of the control pipeline. Each cycle the [`ControllerInterface`] runs, in order and
//! stopping at the first failure:
//!
//! 1. Translation of the raw inputs into the [`LocalView`](crate::local_view::LocalView)
//! 2. Anchor point construction from the raw trajectory
//! 3. Trajectory smoothing, the smoothed trajectory replaces the raw one in the view
//! 4. Input completeness check
//! 5. Input timestamp check, which depending on the configured policy either aborts the cycle or
//!    is only reported
//! 6. Controller reset if the vehicle is not under autonomous control (optional)
//! 7. Controller computation
//! 8. Scaling of the steering target into a physical steering angle

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{
    agent::AgentError,
    anchor::AnchorError,
    controller::STEERING_TARGET_FULL_SCALE,
    params::ParamsError,
    smoother::SmootherError,
    validator::ValidationError,
};

pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Broad classification of pipeline failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    MissingField,
    StaleInput,
    ConfigError,
    ControllerError,
    ResetError,
    SmootherError,
}

/// Possible errors that can occur during a control cycle.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("The controller interface has not been initialised")]
    NotInitialised,

    #[error("Invalid parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("No usable trajectory has been received")]
    MissingTrajectory,

    #[error("Could not build anchor points: {0}")]
    Anchor(AnchorError),

    #[error("Trajectory smoothing failed: {0}")]
    Smoother(SmootherError),

    #[error("Input data check failed: {0}")]
    Input(ValidationError),

    #[error("Input timestamp check failed: {0}")]
    Timestamp(ValidationError),

    #[error(transparent)]
    Agent(AgentError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NotInitialised => ErrorKind::ConfigError,
            PipelineError::InvalidParams(_) => ErrorKind::ConfigError,
            PipelineError::MissingTrajectory => ErrorKind::MissingField,
            PipelineError::Anchor(_) => ErrorKind::InvalidArgument,
            PipelineError::Smoother(_) => ErrorKind::SmootherError,
            PipelineError::Input(_) => ErrorKind::MissingField,
            PipelineError::Timestamp(_) => ErrorKind::StaleInput,
            PipelineError::Agent(e) => match e {
                AgentError::InvalidConf(_)
                | AgentError::InvalidController(_)
                | AgentError::AlreadyInitialised => ErrorKind::ConfigError,
                AgentError::NotInitialised | AgentError::Controller { .. } => {
                    ErrorKind::ControllerError
                }
                AgentError::ResetNotInitialised | AgentError::ResetFailed { .. } => {
                    ErrorKind::ResetError
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a steering target on the [-100, 100] scale into a physical steering angle, in the same
/// unit as `max_steer_angle`.
///
/// The result is not clamped.
pub fn scale_steering_target(steering_target: f64, max_steer_angle: f64) -> f64 {
    steering_target / STEERING_TARGET_FULL_SCALE * max_steer_angle
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::controller::ControllerError;

    #[test]
    fn test_scale_steering_target() {
        assert_eq!(scale_steering_target(50.0, 30.0), 15.0);
        assert_eq!(scale_steering_target(-100.0, 30.0), -30.0);
        assert_eq!(scale_steering_target(0.0, 30.0), 0.0);

        // Out of range targets are passed through
        assert_eq!(scale_steering_target(200.0, 30.0), 60.0);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(PipelineError::MissingTrajectory.kind(), ErrorKind::MissingField);
        assert_eq!(
            PipelineError::Anchor(AnchorError::TooFewPoints(1)).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            PipelineError::Smoother(SmootherError::TooFewAnchors(0)).kind(),
            ErrorKind::SmootherError
        );
        assert_eq!(
            PipelineError::Timestamp(ValidationError::MissingField("chassis")).kind(),
            ErrorKind::StaleInput
        );
        assert_eq!(
            PipelineError::Agent(AgentError::Controller {
                name: "LatPid",
                source: ControllerError::DegenerateTrajectory
            })
            .kind(),
            ErrorKind::ControllerError
        );
        assert_eq!(
            PipelineError::Agent(AgentError::ResetNotInitialised).kind(),
            ErrorKind::ResetError
        );
        assert_eq!(
            PipelineError::Agent(AgentError::AlreadyInitialised).kind(),
            ErrorKind::ConfigError
        );
    }
}

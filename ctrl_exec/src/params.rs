//! Parameters for the control executable
//!
//! All parameters are loaded once from `ctrl.toml` at startup and are read only from then on.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::controller::ControllerType;
use crate::smoother::TrajectorySmootherConfig;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Top level parameters of the control executable.
#[derive(Deserialize, Debug, Clone)]
pub struct CtrlParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    pub control: ControlConf,

    pub smoother: TrajectorySmootherConfig,

    pub vehicle: VehicleParam,
}

/// Parameters for the control pipeline and controller agent.
#[derive(Deserialize, Debug, Clone)]
pub struct ControlConf {
    /// The controller to run, and its parameters.
    pub controller: ControllerType,

    /// Inputs older than this (relative to the cycle time) are stale.
    ///
    /// Units: seconds
    pub max_input_age_s: f64,

    /// Maximum allowed difference between the timestamps of any two inputs.
    ///
    /// Units: seconds
    pub max_input_skew_s: f64,

    /// If false the timestamp check always passes.
    #[serde(default = "default_true")]
    pub enable_input_timestamp_check: bool,

    /// What to do with a cycle whose inputs fail the timestamp check.
    #[serde(default)]
    pub timestamp_failure_policy: TimestampPolicy,

    /// Incomplete input errors are only logged once every this many occurrences.
    #[serde(default = "default_input_error_log_every_n")]
    pub input_error_log_every_n: u64,

    /// Reset the controller on every cycle in which the chassis is not under complete autonomous
    /// control, so no integrator state is carried into the next engagement.
    #[serde(default)]
    pub reset_on_manual_mode: bool,
}

/// Static vehicle parameters needed by the pipeline.
#[derive(Deserialize, Debug, Clone)]
pub struct VehicleParam {
    /// Physical steering angle corresponding to a steering target of 100.
    ///
    /// The pipeline output is in the same unit as this value.
    pub max_steer_angle: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Handling of a cycle in which the inputs are not mutually fresh.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// The cycle is aborted and no command is produced.
    Abort,

    /// The failure is logged and recorded in the cycle's status report, but the controller is
    /// still run on the inputs.
    Continue,
}

/// Errors raised while validating parameters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParamsError {
    #[error("Parameter `{name}` has invalid value {value}, expected {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TimestampPolicy {
    fn default() -> Self {
        TimestampPolicy::Abort
    }
}

impl CtrlParams {
    /// Check that every parameter is in its valid range.
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_positive("cycle_period_s", self.cycle_period_s)?;
        self.control.validate()?;
        self.smoother.validate()?;
        self.vehicle.validate()
    }
}

impl ControlConf {
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_positive("max_input_age_s", self.max_input_age_s)?;
        check_positive("max_input_skew_s", self.max_input_skew_s)?;
        self.controller.validate()
    }
}

impl VehicleParam {
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_positive("max_steer_angle", self.max_steer_angle)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that the value is finite and strictly positive.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), ParamsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamsError::OutOfRange {
            name,
            value,
            expected: "a finite value greater than zero",
        })
    }
}

/// Check that the value is finite and not negative.
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), ParamsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParamsError::OutOfRange {
            name,
            value,
            expected: "a finite value not less than zero",
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_input_error_log_every_n() -> u64 {
    100
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Parameters matching `params/ctrl.toml`
    pub(crate) const CTRL_TOML: &str = r#"
        cycle_period_s = 0.05

        [control]
        max_input_age_s = 0.5
        max_input_skew_s = 0.2
        input_error_log_every_n = 100
        reset_on_manual_mode = true

        [control.controller]
        type = "LatPid"
        lat_k_p = 40.0
        lat_k_i = 0.5
        lat_k_d = 2.0
        head_k_p = 80.0
        head_k_i = 0.0
        head_k_d = 1.0

        [smoother]
        max_lateral_boundary_bound = 0.2
        longitudinal_boundary_bound = 0.5
        smoothing_weight = 0.5
        max_iterations = 20

        [vehicle]
        max_steer_angle = 0.5236
    "#;

    #[test]
    fn test_params_from_toml() {
        let params: CtrlParams = util::params::load_str(CTRL_TOML).unwrap();

        assert!(params.validate().is_ok());
        assert!(params.control.enable_input_timestamp_check);
        assert_eq!(params.control.timestamp_failure_policy, TimestampPolicy::Abort);
        assert!(matches!(params.control.controller, ControllerType::LatPid(_)));
        assert_eq!(params.smoother.max_iterations, 20);
    }

    #[test]
    fn test_params_validation() {
        let mut params: CtrlParams = util::params::load_str(CTRL_TOML).unwrap();

        params.control.max_input_skew_s = -0.1;
        match params.validate() {
            Err(ParamsError::OutOfRange { name, .. }) => assert_eq!(name, "max_input_skew_s"),
            r => panic!("Expected out of range error, got {:?}", r),
        }

        params.control.max_input_skew_s = 0.2;
        params.vehicle.max_steer_angle = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_stanley_and_continue_policy_from_toml() {
        let toml = CTRL_TOML
            .replace("type = \"LatPid\"", "type = \"Stanley\"\ngain = 1.5\nsoftening_speed_ms = 1.0\nmax_steer_angle_rad = 0.5")
            .replace("reset_on_manual_mode = true", "timestamp_failure_policy = \"Continue\"");
        let params: CtrlParams = util::params::load_str(&toml).unwrap();

        assert!(matches!(params.control.controller, ControllerType::Stanley(_)));
        assert_eq!(params.control.timestamp_failure_policy, TimestampPolicy::Continue);
        assert!(!params.control.reset_on_manual_mode);
    }
}

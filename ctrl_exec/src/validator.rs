//! # Input validation
//!
//! Two checks are run on the [`LocalView`] each cycle before the controller is invoked:
//!
//! - [`InputValidator::check_input`] - all three inputs are present and the trajectory has at
//!   least one point.
//! - [`InputValidator::check_timestamp`] - all inputs are recent relative to the cycle time, and
//!   were stamped close enough to each other that they describe the same moment.
//!
//! The validator only reports, the logging and abort policy belongs to the caller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::{local_view::LocalView, params::ControlConf};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct InputValidator {
    max_input_age_s: f64,
    max_input_skew_s: f64,
    timestamp_check_enabled: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("No {0} has been received")]
    MissingField(&'static str),

    #[error("The trajectory contains no points")]
    EmptyTrajectory,

    #[error("The {input} is {age_s:.3} s old, limit is {max_age_s:.3} s")]
    StaleInput {
        input: &'static str,
        age_s: f64,
        max_age_s: f64,
    },

    #[error("The {first} and {second} timestamps differ by {skew_s:.3} s, limit is {max_skew_s:.3} s")]
    TimestampSkew {
        first: &'static str,
        second: &'static str,
        skew_s: f64,
        max_skew_s: f64,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl InputValidator {
    pub fn new(conf: &ControlConf) -> Self {
        Self {
            max_input_age_s: conf.max_input_age_s,
            max_input_skew_s: conf.max_input_skew_s,
            timestamp_check_enabled: conf.enable_input_timestamp_check,
        }
    }

    /// Check that the view is structurally complete.
    pub fn check_input(&self, local_view: &LocalView) -> Result<(), ValidationError> {
        if local_view.localization.is_none() {
            return Err(ValidationError::MissingField("localization"));
        }
        if local_view.chassis.is_none() {
            return Err(ValidationError::MissingField("chassis"));
        }

        match local_view.trajectory {
            None => Err(ValidationError::MissingField("trajectory")),
            Some(ref t) if t.is_empty() => Err(ValidationError::EmptyTrajectory),
            Some(_) => Ok(()),
        }
    }

    /// Check that every input present in the view is fresh at time `now_s`, and that they were all
    /// stamped within the skew tolerance of each other.
    ///
    /// Inputs stamped in the future (negative age) pass the age check but are still subject to the
    /// skew check.
    pub fn check_timestamp(&self, local_view: &LocalView, now_s: f64) -> Result<(), ValidationError> {
        if !self.timestamp_check_enabled {
            return Ok(());
        }

        let mut stamps: Vec<(&'static str, f64)> = Vec::with_capacity(3);
        if let Some(ref l) = local_view.localization {
            stamps.push(("localization", l.header.timestamp_s));
        }
        if let Some(ref c) = local_view.chassis {
            stamps.push(("chassis", c.header.timestamp_s));
        }
        if let Some(ref t) = local_view.trajectory {
            stamps.push(("trajectory", t.header.timestamp_s));
        }

        // A NaN age or skew must fail, so compare with `!(x <= limit)`
        for &(input, stamp_s) in stamps.iter() {
            let age_s = now_s - stamp_s;
            if !(age_s <= self.max_input_age_s) {
                return Err(ValidationError::StaleInput {
                    input,
                    age_s,
                    max_age_s: self.max_input_age_s,
                });
            }
        }

        for (i, &(first, first_s)) in stamps.iter().enumerate() {
            for &(second, second_s) in stamps.iter().skip(i + 1) {
                let skew_s = (first_s - second_s).abs();
                if !(skew_s <= self.max_input_skew_s) {
                    return Err(ValidationError::TimestampSkew {
                        first,
                        second,
                        skew_s,
                        max_skew_s: self.max_input_skew_s,
                    });
                }
            }
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::controller::{ControllerType, StanleyParams};
    use crate::params::TimestampPolicy;
    use comms_if::msg::{AdcTrajectory, Chassis, Header, LocalizationEstimate, TrajectoryPoint};

    fn conf() -> ControlConf {
        ControlConf {
            controller: ControllerType::Stanley(StanleyParams {
                gain: 1.0,
                softening_speed_ms: 1.0,
                max_steer_angle_rad: 0.5,
            }),
            max_input_age_s: 0.5,
            max_input_skew_s: 0.2,
            enable_input_timestamp_check: true,
            timestamp_failure_policy: TimestampPolicy::Abort,
            input_error_log_every_n: 100,
            reset_on_manual_mode: false,
        }
    }

    fn view(loc_s: f64, chassis_s: f64, traj_s: f64, num_points: usize) -> LocalView {
        LocalView {
            localization: Some(LocalizationEstimate {
                header: Header::new(loc_s),
                ..Default::default()
            }),
            chassis: Some(Chassis {
                header: Header::new(chassis_s),
                ..Default::default()
            }),
            trajectory: Some(AdcTrajectory {
                header: Header::new(traj_s),
                trajectory_point: vec![TrajectoryPoint::default(); num_points],
            }),
        }
    }

    #[test]
    fn test_check_input() {
        let validator = InputValidator::new(&conf());

        assert_eq!(validator.check_input(&view(1.0, 1.0, 1.0, 5)), Ok(()));
        assert_eq!(validator.check_input(&view(1.0, 1.0, 1.0, 1)), Ok(()));

        assert_eq!(
            validator.check_input(&view(1.0, 1.0, 1.0, 0)),
            Err(ValidationError::EmptyTrajectory)
        );

        let mut v = view(1.0, 1.0, 1.0, 5);
        v.localization = None;
        assert_eq!(
            validator.check_input(&v),
            Err(ValidationError::MissingField("localization"))
        );

        let mut v = view(1.0, 1.0, 1.0, 5);
        v.chassis = None;
        assert_eq!(validator.check_input(&v), Err(ValidationError::MissingField("chassis")));

        let mut v = view(1.0, 1.0, 1.0, 5);
        v.trajectory = None;
        assert_eq!(validator.check_input(&v), Err(ValidationError::MissingField("trajectory")));

        assert!(validator.check_input(&LocalView::default()).is_err());
    }

    #[test]
    fn test_check_timestamp_fresh() {
        let validator = InputValidator::new(&conf());

        assert_eq!(validator.check_timestamp(&view(10.0, 10.0, 10.0, 5), 10.0), Ok(()));
        assert_eq!(validator.check_timestamp(&view(9.9, 9.8, 9.75, 5), 10.0), Ok(()));

        // Exactly on the limits is still fresh
        assert_eq!(validator.check_timestamp(&view(9.5, 9.5, 9.5, 5), 10.0), Ok(()));
    }

    #[test]
    fn test_check_timestamp_stale() {
        let validator = InputValidator::new(&conf());

        match validator.check_timestamp(&view(10.0, 10.0, 9.4, 5), 10.0) {
            Err(ValidationError::StaleInput { input, .. }) => assert_eq!(input, "trajectory"),
            r => panic!("Expected stale trajectory, got {:?}", r),
        }

        match validator.check_timestamp(&view(8.0, 10.0, 10.0, 5), 10.0) {
            Err(ValidationError::StaleInput { input, .. }) => assert_eq!(input, "localization"),
            r => panic!("Expected stale localization, got {:?}", r),
        }

        match validator.check_timestamp(&view(10.0, f64::NAN, 10.0, 5), 10.0) {
            Err(ValidationError::StaleInput { input, .. }) => assert_eq!(input, "chassis"),
            r => panic!("Expected stale chassis, got {:?}", r),
        }
    }

    #[test]
    fn test_check_timestamp_skew() {
        let validator = InputValidator::new(&conf());

        // All fresh, but localization and trajectory 0.3 s apart
        match validator.check_timestamp(&view(10.0, 9.9, 9.7, 5), 10.0) {
            Err(ValidationError::TimestampSkew { first, second, .. }) => {
                assert_eq!(first, "localization");
                assert_eq!(second, "trajectory");
            }
            r => panic!("Expected skew error, got {:?}", r),
        }

        // Future stamps pass the age check but not the skew check
        assert_eq!(validator.check_timestamp(&view(10.1, 10.1, 10.1, 5), 10.0), Ok(()));
        assert!(validator.check_timestamp(&view(10.5, 10.0, 10.0, 5), 10.0).is_err());
    }

    #[test]
    fn test_check_timestamp_disabled() {
        let mut c = conf();
        c.enable_input_timestamp_check = false;
        let validator = InputValidator::new(&c);

        assert_eq!(validator.check_timestamp(&view(0.0, 5.0, 10.0, 5), 100.0), Ok(()));
    }
}

//! # Controller agent
//!
//! The agent owns the single active [`Controller`] instance. It builds the controller from the
//! configuration on [`ControllerAgent::init`], forwards each cycle's inputs to it and manages its
//! reset lifecycle.
//!
//! `init` may only be called on a fresh agent, or after [`ControllerAgent::reset`]. In the latter
//! case the previous controller is dropped before the new one is built, so that at no point are
//! two instances alive.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use std::time::Instant;

use comms_if::msg::{AdcTrajectory, Chassis, ControlCommand, LocalizationEstimate};
use util::time::std_duration_to_millis;

use crate::{
    controller::{Controller, ControllerError},
    params::{ControlConf, ParamsError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct ControllerAgent {
    controller: Option<Box<dyn Controller>>,

    /// True if `reset` has been called since the current controller was installed.
    reset_since_init: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("Invalid control configuration: {0}")]
    InvalidConf(ParamsError),

    #[error("Could not build the controller: {0}")]
    InvalidController(ControllerError),

    #[error("The agent already holds a controller, it must be reset before it is initialised again")]
    AlreadyInitialised,

    #[error("The agent has not been initialised")]
    NotInitialised,

    #[error("Controller {name} failed: {source}")]
    Controller {
        name: &'static str,
        source: ControllerError,
    },

    #[error("Cannot reset the agent as it has not been initialised")]
    ResetNotInitialised,

    #[error("Controller {name} could not be reset: {source}")]
    ResetFailed {
        name: &'static str,
        source: ControllerError,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ControllerAgent {
    /// Validate the configuration and build the controller it selects.
    pub fn init(&mut self, conf: &ControlConf) -> Result<(), AgentError> {
        conf.validate().map_err(AgentError::InvalidConf)?;

        self.install(|| conf.controller.build())?;

        info!(
            "ControllerAgent initialised with the {} controller",
            conf.controller.name()
        );

        Ok(())
    }

    /// Replace the held controller with the one produced by `build`.
    pub(crate) fn install<F>(&mut self, build: F) -> Result<(), AgentError>
    where
        F: FnOnce() -> Result<Box<dyn Controller>, ControllerError>,
    {
        if self.controller.is_some() && !self.reset_since_init {
            return Err(AgentError::AlreadyInitialised);
        }

        // Drop the old instance first
        self.controller = None;

        self.controller = Some(build().map_err(AgentError::InvalidController)?);
        self.reset_since_init = false;

        Ok(())
    }

    /// Run the held controller on the given inputs.
    pub fn compute_control_command(
        &mut self,
        localization: &LocalizationEstimate,
        chassis: &Chassis,
        trajectory: &AdcTrajectory,
    ) -> Result<ControlCommand, AgentError> {
        let controller = self.controller.as_mut().ok_or(AgentError::NotInitialised)?;
        let name = controller.name();

        let start = Instant::now();
        let result = controller.compute_control_command(localization, chassis, trajectory);

        debug!(
            "{} controller computation took {:.3} ms",
            name,
            std_duration_to_millis(start.elapsed())
        );

        result.map_err(|source| AgentError::Controller { name, source })
    }

    /// Discard the held controller's history.
    pub fn reset(&mut self) -> Result<(), AgentError> {
        let controller = self
            .controller
            .as_mut()
            .ok_or(AgentError::ResetNotInitialised)?;
        let name = controller.name();

        controller
            .reset()
            .map_err(|source| AgentError::ResetFailed { name, source })?;

        self.reset_since_init = true;
        debug!("{} controller reset", name);

        Ok(())
    }

    pub fn is_initialised(&self) -> bool {
        self.controller.is_some()
    }

    /// Name of the held controller, if any.
    pub fn controller_name(&self) -> Option<&'static str> {
        self.controller.as_ref().map(|c| c.name())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::controller::test::{localization_at, straight_trajectory};
    use crate::params::{test::CTRL_TOML, CtrlParams};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A controller which keeps count of how many instances of it are alive.
    struct Counted {
        live: &'static AtomicUsize,
        fail_reset: bool,
    }

    impl Counted {
        fn boxed(
            live: &'static AtomicUsize,
            fail_reset: bool,
        ) -> Result<Box<dyn Controller>, ControllerError> {
            live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Counted { live, fail_reset }))
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl Controller for Counted {
        fn name(&self) -> &'static str {
            "Counted"
        }

        fn compute_control_command(
            &mut self,
            _localization: &LocalizationEstimate,
            _chassis: &Chassis,
            _trajectory: &AdcTrajectory,
        ) -> Result<ControlCommand, ControllerError> {
            Err(ControllerError::DegenerateTrajectory)
        }

        fn reset(&mut self) -> Result<(), ControllerError> {
            if self.fail_reset {
                Err(ControllerError::NonFinite("state"))
            } else {
                Ok(())
            }
        }
    }

    fn conf() -> ControlConf {
        util::params::load_str::<CtrlParams>(CTRL_TOML).unwrap().control
    }

    #[test]
    fn test_lifecycle() {
        let mut agent = ControllerAgent::default();
        let traj = straight_trajectory(5, 0.0);
        let loc = localization_at(1.0, 0.0, 0.0, 0.0);

        assert!(!agent.is_initialised());
        assert!(matches!(
            agent.compute_control_command(&loc, &Chassis::default(), &traj),
            Err(AgentError::NotInitialised)
        ));
        assert!(matches!(agent.reset(), Err(AgentError::ResetNotInitialised)));

        agent.init(&conf()).unwrap();
        assert_eq!(agent.controller_name(), Some("LatPid"));

        let cmd = agent
            .compute_control_command(&loc, &Chassis::default(), &traj)
            .unwrap();
        assert_eq!(cmd.steering_target, 0.0);

        // Double init is rejected, but allowed after a reset
        assert!(matches!(agent.init(&conf()), Err(AgentError::AlreadyInitialised)));
        agent.reset().unwrap();
        agent.init(&conf()).unwrap();
        assert!(agent.is_initialised());
    }

    #[test]
    fn test_invalid_conf() {
        let mut agent = ControllerAgent::default();
        let mut c = conf();
        c.max_input_age_s = 0.0;

        assert!(matches!(agent.init(&c), Err(AgentError::InvalidConf(_))));
        assert!(!agent.is_initialised());
    }

    #[test]
    fn test_single_ownership() {
        static LIVE: AtomicUsize = AtomicUsize::new(0);
        let mut agent = ControllerAgent::default();

        agent.install(|| Counted::boxed(&LIVE, false)).unwrap();
        assert_eq!(LIVE.load(Ordering::SeqCst), 1);

        agent.reset().unwrap();
        agent
            .install(|| {
                // The previous instance is gone before the new one is built
                assert_eq!(LIVE.load(Ordering::SeqCst), 0);
                Counted::boxed(&LIVE, false)
            })
            .unwrap();
        assert_eq!(LIVE.load(Ordering::SeqCst), 1);

        drop(agent);
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_controller_errors_propagate() {
        static LIVE: AtomicUsize = AtomicUsize::new(0);
        let mut agent = ControllerAgent::default();
        agent.install(|| Counted::boxed(&LIVE, true)).unwrap();

        match agent.compute_control_command(
            &localization_at(0.0, 0.0, 0.0, 0.0),
            &Chassis::default(),
            &straight_trajectory(3, 0.0),
        ) {
            Err(AgentError::Controller { name, source: ControllerError::DegenerateTrajectory }) => {
                assert_eq!(name, "Counted")
            }
            r => panic!("Expected controller error, got {:?}", r.map(|c| c.steering_target)),
        }

        assert!(matches!(agent.reset(), Err(AgentError::ResetFailed { .. })));

        // A failed reset does not allow re-initialisation
        assert!(matches!(
            agent.install(|| Counted::boxed(&LIVE, false)),
            Err(AgentError::AlreadyInitialised)
        ));
    }
}

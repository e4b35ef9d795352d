//! Implementations for the ControllerInterface state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, trace, warn};

// Internal
use super::{scale_steering_target, PipelineError};
use crate::{
    adapter::MsgAdapter,
    agent::ControllerAgent,
    anchor::build_anchor_points,
    local_view::LocalView,
    params::{CtrlParams, TimestampPolicy},
    smoother::{DiscretePointsSmoother, TrajectorySmoother},
    validator::{InputValidator, ValidationError},
};
use comms_if::msg::{AdcTrajectory, ControlCommand, DrivingMode, Header};
use util::{error_every, logger::LogEvery, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control pipeline state
pub struct ControllerInterface<A: MsgAdapter> {
    adapter: A,

    params: Option<CtrlParams>,

    controller_agent: ControllerAgent,

    smoother: Option<Box<dyn TrajectorySmoother>>,

    validator: Option<InputValidator>,

    /// Inputs of the current cycle
    local_view: LocalView,

    /// True once the trajectory in the local view has been replaced by the smoothed one
    trajectory_smoothed: bool,

    /// Command produced in the current cycle, if any
    control_command: Option<ControlCommand>,

    /// Rate limit on input check error logs
    input_error_log: LogEvery,

    /// Sequence number of the next published command
    sequence_num: u32,
}

/// Raw inputs for one control cycle, in the adapter's message family.
///
/// A `None` input has not been received this cycle.
pub struct InputData<A: MsgAdapter> {
    /// Time of the control cycle, on the same clock as the message timestamps.
    ///
    /// Units: seconds
    pub now_s: f64,

    pub localization: Option<A::Localization>,
    pub motion: Option<A::Motion>,
    pub feedback: Option<A::Feedback>,
    pub trajectory: Option<A::Trajectory>,
}

/// Output of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputData {
    /// Steering angle to command, in the unit of `max_steer_angle`.
    pub steering_angle: f64,

    /// The controller's command from which the angle was computed.
    pub command: ControlCommand,
}

/// Status report for a successful cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    /// Input check failure which did not abort the cycle, only set under the `Continue` timestamp
    /// policy.
    pub input_status: Option<ValidationError>,

    /// True if the controller was reset before the computation.
    pub controller_reset: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: MsgAdapter> ControllerInterface<A> {
    /// Create a new, uninitialised, interface using the given adapter.
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            params: None,
            controller_agent: ControllerAgent::default(),
            smoother: None,
            validator: None,
            local_view: LocalView::default(),
            trajectory_smoothed: false,
            control_command: None,
            input_error_log: LogEvery::new(1),
            sequence_num: 0,
        }
    }

    /// Reset the controller, after which the interface may be initialised again.
    pub fn reset(&mut self) -> Result<(), PipelineError> {
        self.controller_agent.reset().map_err(|e| {
            error!("Could not reset the controller: {}", e);
            PipelineError::Agent(e)
        })
    }

    /// Inputs of the last cycle, with the trajectory smoothed if smoothing succeeded.
    pub fn local_view(&self) -> &LocalView {
        &self.local_view
    }

    /// The smoothed trajectory of the last cycle, if smoothing succeeded.
    pub fn smoothed_trajectory(&self) -> Option<&AdcTrajectory> {
        if self.trajectory_smoothed {
            self.local_view.trajectory.as_ref()
        } else {
            None
        }
    }

    /// The command of the last cycle, if it succeeded.
    pub fn control_command(&self) -> Option<&ControlCommand> {
        self.control_command.as_ref()
    }

    /// Translate the raw inputs into the local view.
    fn ingest(&mut self, input_data: &InputData<A>) {
        self.local_view.clear();
        self.trajectory_smoothed = false;
        self.control_command = None;

        self.local_view.localization = match (&input_data.localization, &input_data.motion) {
            (Some(l), Some(m)) => self.adapter.to_localization(l, m),
            _ => None,
        };
        self.local_view.chassis = input_data
            .feedback
            .as_ref()
            .and_then(|f| self.adapter.to_chassis(f));
        self.local_view.trajectory = input_data
            .trajectory
            .as_ref()
            .and_then(|t| self.adapter.to_trajectory(t));
    }
}

impl<A: MsgAdapter> State for ControllerInterface<A> {
    type InitData = CtrlParams;
    type InitError = PipelineError;

    type InputData = InputData<A>;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = PipelineError;

    /// Initialise the pipeline from the already loaded parameters.
    ///
    /// Fails if the parameters are invalid, or if the controller has already been initialised and
    /// not reset since.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate().map_err(PipelineError::InvalidParams)?;

        self.controller_agent
            .init(&init_data.control)
            .map_err(PipelineError::Agent)?;

        self.smoother = Some(Box::new(DiscretePointsSmoother::new(
            init_data.smoother.clone(),
        )));
        self.validator = Some(InputValidator::new(&init_data.control));
        self.input_error_log = LogEvery::new(init_data.control.input_error_log_every_n);
        self.params = Some(init_data);

        info!("ControllerInterface initialised");

        Ok(())
    }

    /// Run one control cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Get the parameters needed for this cycle
        let (lat_bound, lon_bound, max_steer_angle, policy, reset_on_manual) = match self.params {
            Some(ref p) => (
                p.smoother.max_lateral_boundary_bound,
                p.smoother.longitudinal_boundary_bound,
                p.vehicle.max_steer_angle,
                p.control.timestamp_failure_policy,
                p.control.reset_on_manual_mode,
            ),
            None => return Err(PipelineError::NotInitialised),
        };

        let mut report = StatusReport::default();

        // ---- INPUTS ----

        self.ingest(input_data);

        // ---- SMOOTHING ----

        let raw_trajectory = match self.local_view.trajectory {
            Some(ref t) => t,
            None => {
                error_every!(
                    self.input_error_log,
                    "No usable trajectory for this cycle ({} occurrence(s))",
                    self.input_error_log.count()
                );
                return Err(PipelineError::MissingTrajectory);
            }
        };

        let anchor_points = match build_anchor_points(raw_trajectory, lat_bound, lon_bound) {
            Ok(a) => a,
            Err(e) => {
                error_every!(
                    self.input_error_log,
                    "Failed to build anchor points: {} ({} occurrence(s))",
                    e,
                    self.input_error_log.count()
                );
                return Err(PipelineError::Anchor(e));
            }
        };

        let smoother = self.smoother.as_mut().ok_or(PipelineError::NotInitialised)?;
        let smoothed = smoother.smooth(&anchor_points, raw_trajectory).map_err(|e| {
            error!("Failed to smooth the trajectory: {}", e);
            PipelineError::Smoother(e)
        })?;

        trace!("Smoothed trajectory: {:?}", smoothed.trajectory_point);
        self.local_view.trajectory = Some(smoothed);
        self.trajectory_smoothed = true;

        // ---- INPUT CHECKS ----

        let validator = self.validator.as_ref().ok_or(PipelineError::NotInitialised)?;

        if let Err(e) = validator.check_input(&self.local_view) {
            error_every!(
                self.input_error_log,
                "Control input data failed the check, skipping the cycle: {} ({} occurrence(s))",
                e,
                self.input_error_log.count()
            );
            return Err(PipelineError::Input(e));
        }

        if let Err(e) = validator.check_timestamp(&self.local_view, input_data.now_s) {
            error!("Input messages timestamp check failed: {}", e);

            match policy {
                TimestampPolicy::Abort => return Err(PipelineError::Timestamp(e)),
                TimestampPolicy::Continue => {
                    warn!("Continuing the cycle with stale inputs");
                    report.input_status = Some(e);
                }
            }
        }

        let (localization, chassis, trajectory) = match (
            &self.local_view.localization,
            &self.local_view.chassis,
            &self.local_view.trajectory,
        ) {
            (Some(l), Some(c), Some(t)) => (l, c, t),
            _ => return Err(PipelineError::Input(ValidationError::MissingField("input"))),
        };

        // ---- CONTROLLER ----

        if reset_on_manual && chassis.driving_mode != DrivingMode::CompleteAuto {
            debug!(
                "Vehicle is in {:?} mode, resetting the controller",
                chassis.driving_mode
            );

            self.controller_agent.reset().map_err(|e| {
                error!("Could not reset the controller: {}", e);
                PipelineError::Agent(e)
            })?;
            report.controller_reset = true;
        }

        let mut command = self
            .controller_agent
            .compute_control_command(localization, chassis, trajectory)
            .map_err(|e| {
                error!("Controller computation failed: {}", e);
                PipelineError::Agent(e)
            })?;

        // ---- OUTPUT ----

        command.header = Header {
            timestamp_s: input_data.now_s,
            sequence_num: self.sequence_num,
        };
        self.sequence_num = self.sequence_num.wrapping_add(1);

        let steering_angle = scale_steering_target(command.steering_target, max_steer_angle);

        trace!(
            "Steering target {:.3} -> angle {:.6}",
            command.steering_target,
            steering_angle
        );

        self.control_command = Some(command.clone());

        Ok((
            OutputData {
                steering_angle,
                command,
            },
            report,
        ))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

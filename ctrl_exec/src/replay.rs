//! # Replay sources
//!
//! Frames of bridge messages for the executable to run through the pipeline, one frame per cycle.
//! Frames are either loaded from a replay file (a JSON array of
//! [`ReplayFrame`](comms_if::bridge::ReplayFrame)s) or synthesised.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use comms_if::bridge::{
    parse_replay, GnssPose, PlannedPath, PlannedPoint, ReplayFrame, SteerFeedback, VehicleMotion,
};

use crate::{adapter::BridgeAdapter, interface::InputData};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Speed of the vehicle in the synthetic scenario.
const SYNTH_SPEED_MS: f64 = 2.0;

/// Number of points in each synthetic path.
const SYNTH_NUM_PATH_POINTS: usize = 10;

/// Time between synthetic path points.
const SYNTH_POINT_DT_S: f64 = 0.5;

/// Age of the synthetic path relative to the other messages.
const SYNTH_PATH_DELAY_S: f64 = 0.02;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A queue of frames to replay.
#[derive(Debug, Default)]
pub struct ReplaySource {
    /// Path of the file the frames were loaded from, `None` if synthesised
    source_path: Option<PathBuf>,

    frames: VecDeque<ReplayFrame>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Could not find the replay file at {0:?}")]
    NotFound(PathBuf),

    #[error("Could not load the replay file: {0}")]
    LoadError(std::io::Error),

    #[error("Could not parse the replay file: {0}")]
    ParseError(serde_json::Error),

    #[error("The replay file contains no frames")]
    Empty,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ReplaySource {
    /// Load the frames from the replay file at the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let path = PathBuf::from(path.as_ref());

        if !path.exists() {
            return Err(ReplayError::NotFound(path));
        }

        let json = fs::read_to_string(&path).map_err(ReplayError::LoadError)?;
        let frames = parse_replay(&json).map_err(ReplayError::ParseError)?;

        if frames.is_empty() {
            return Err(ReplayError::Empty);
        }

        Ok(Self {
            source_path: Some(path),
            frames: frames.into(),
        })
    }

    /// Synthesise a scenario in which the vehicle drives along a straight path on LM_X, starting
    /// `lateral_offset_m` to the side of it. The offset shrinks linearly to zero over the
    /// scenario.
    ///
    /// Frame `i` is at `start_s + i * period_s`, with all messages fresh.
    pub fn synthetic(num_frames: usize, start_s: f64, period_s: f64, lateral_offset_m: f64) -> Self {
        let frames = (0..num_frames)
            .map(|i| {
                let now_s = start_s + i as f64 * period_s;
                let x_m = SYNTH_SPEED_MS * i as f64 * period_s;
                let y_m = lateral_offset_m * (1.0 - i as f64 / num_frames as f64);

                // The path starts one meter behind the vehicle, one point per SYNTH_POINT_DT_S
                let first_x_m = x_m.floor() - 1.0;
                let points = (0..SYNTH_NUM_PATH_POINTS)
                    .map(|j| PlannedPoint {
                        x_m: first_x_m + SYNTH_SPEED_MS * SYNTH_POINT_DT_S * j as f64,
                        y_m: 0.0,
                        speed_ms: SYNTH_SPEED_MS,
                    })
                    .collect();

                ReplayFrame {
                    now_s,
                    pose: GnssPose {
                        stamp_s: now_s,
                        x_m,
                        y_m,
                        z_m: 0.0,
                        yaw_rad: 0.0,
                    },
                    motion: VehicleMotion {
                        stamp_s: now_s,
                        speed_ms: SYNTH_SPEED_MS,
                        yaw_rate_rads: 0.0,
                    },
                    feedback: SteerFeedback {
                        stamp_s: now_s,
                        speed_ms: SYNTH_SPEED_MS,
                        steer_pct: 0.0,
                        auto_enabled: true,
                        estop: false,
                    },
                    path: PlannedPath {
                        stamp_s: now_s - SYNTH_PATH_DELAY_S,
                        point_dt_s: SYNTH_POINT_DT_S,
                        points,
                    },
                }
            })
            .collect();

        Self {
            source_path: None,
            frames,
        }
    }

    /// Pop the next frame, or `None` at the end of the replay.
    pub fn next_frame(&mut self) -> Option<ReplayFrame> {
        self.frames.pop_front()
    }

    /// Number of frames left.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Time between the first and last remaining frames.
    pub fn duration_s(&self) -> f64 {
        match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) => last.now_s - first.now_s,
            _ => 0.0,
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Turn a frame into pipeline input data, every message of the frame is present.
pub fn frame_to_input(frame: ReplayFrame) -> InputData<BridgeAdapter> {
    InputData {
        now_s: frame.now_s,
        localization: Some(frame.pose),
        motion: Some(frame.motion),
        feedback: Some(frame.feedback),
        trajectory: Some(frame.path),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_synthetic() {
        let mut source = ReplaySource::synthetic(20, 100.0, 0.05, 0.5);

        assert_eq!(source.num_frames(), 20);
        assert!((source.duration_s() - 0.95).abs() < 1e-9);
        assert!(source.source_path().is_none());

        let first = source.next_frame().unwrap();
        assert_eq!(first.now_s, 100.0);
        assert_eq!(first.pose.y_m, 0.5);
        assert_eq!(first.path.points.len(), SYNTH_NUM_PATH_POINTS);
        assert_eq!(first.path.points[0].x_m, -1.0);

        let input = frame_to_input(first);
        assert_eq!(input.now_s, 100.0);
        assert!(input.localization.is_some() && input.trajectory.is_some());

        assert_eq!(source.num_frames(), 19);
        while source.next_frame().is_some() {}
        assert_eq!(source.duration_s(), 0.0);
    }

    #[test]
    fn test_demo_replay_through_pipeline() {
        use crate::params::{test::CTRL_TOML, CtrlParams};
        use util::module::State;

        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/straight_offset.json");
        let mut source = ReplaySource::from_path(path).unwrap();
        assert_eq!(source.num_frames(), 20);
        assert!(source.source_path().is_some());

        let params: CtrlParams = util::params::load_str(CTRL_TOML).unwrap();
        let max_steer_angle = params.vehicle.max_steer_angle;
        let mut ci = crate::interface::ControllerInterface::new(BridgeAdapter);
        ci.init(params).unwrap();

        let mut num_resets = 0;
        while let Some(frame) = source.next_frame() {
            let (output, report) = ci.proc(&frame_to_input(frame)).unwrap();

            assert!(output.steering_angle.abs() <= max_steer_angle);
            assert!(report.input_status.is_none());
            if report.controller_reset {
                num_resets += 1;
            }
        }

        // Autonomous control is only enabled from the fourth frame
        assert_eq!(num_resets, 3);
    }

    #[test]
    fn test_missing_file() {
        match ReplaySource::from_path("this/file/does/not/exist.json") {
            Err(ReplayError::NotFound(_)) => (),
            r => panic!("Expected not found error, got {:?}", r),
        }
    }
}

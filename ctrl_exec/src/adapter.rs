//! # Message adapters
//!
//! The pipeline only consumes the internal messages in [`comms_if::msg`]. Each upstream message
//! family gets one implementation of [`MsgAdapter`] which translates its messages into these.
//!
//! An adapter returns `None` for a message it cannot use (for instance one containing non-finite
//! values), which leaves the corresponding field of the local view unset for the cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    bridge::{GnssPose, PlannedPath, SteerFeedback, VehicleMotion},
    msg::{
        AdcTrajectory, Chassis, DrivingMode, Header, LocalizationEstimate, PathPoint, Pose,
        TrajectoryPoint,
    },
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Translation of one upstream message family into the internal messages.
pub trait MsgAdapter {
    /// Message(s) carrying the vehicle pose
    type Localization;

    /// Message(s) carrying the vehicle's body motion
    type Motion;

    /// Message carrying the chassis feedback
    type Feedback;

    /// Message carrying the planned trajectory
    type Trajectory;

    fn to_localization(
        &self,
        pose: &Self::Localization,
        motion: &Self::Motion,
    ) -> Option<LocalizationEstimate>;

    fn to_chassis(&self, feedback: &Self::Feedback) -> Option<Chassis>;

    fn to_trajectory(&self, trajectory: &Self::Trajectory) -> Option<AdcTrajectory>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Adapter for the navigation stack bridge messages, see [`comms_if::bridge`].
#[derive(Debug, Default, Copy, Clone)]
pub struct BridgeAdapter;

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl MsgAdapter for BridgeAdapter {
    type Localization = GnssPose;
    type Motion = VehicleMotion;
    type Feedback = SteerFeedback;
    type Trajectory = PlannedPath;

    /// The pose gives the position and heading, the motion the velocities. The estimate is
    /// stamped with the older of the two times, so a stale motion makes the whole estimate stale.
    fn to_localization(&self, pose: &GnssPose, motion: &VehicleMotion) -> Option<LocalizationEstimate> {
        if !(pose.stamp_s.is_finite() && motion.stamp_s.is_finite()) {
            return None;
        }

        let estimate = LocalizationEstimate {
            header: Header::new(pose.stamp_s.min(motion.stamp_s)),
            pose: Pose {
                position_m: [pose.x_m, pose.y_m, pose.z_m],
                heading_rad: pose.yaw_rad,
                linear_velocity_ms: motion.speed_ms,
                angular_velocity_rads: motion.yaw_rate_rads,
            },
        };

        if estimate.pose.is_finite() {
            Some(estimate)
        } else {
            None
        }
    }

    fn to_chassis(&self, feedback: &SteerFeedback) -> Option<Chassis> {
        if !(feedback.stamp_s.is_finite()
            && feedback.speed_ms.is_finite()
            && feedback.steer_pct.is_finite())
        {
            return None;
        }

        let driving_mode = if feedback.estop {
            DrivingMode::EmergencyMode
        } else if feedback.auto_enabled {
            DrivingMode::CompleteAuto
        } else {
            DrivingMode::Manual
        };

        Some(Chassis {
            header: Header::new(feedback.stamp_s),
            speed_ms: feedback.speed_ms,
            steering_percentage: feedback.steer_pct,
            driving_mode,
        })
    }

    /// Headings point towards the next point (the last point keeps the heading of the one before
    /// it), arc lengths accumulate from the first point, and point `i` is `i * point_dt_s` into the
    /// trajectory.
    ///
    /// A path without points gives an empty trajectory rather than `None`.
    fn to_trajectory(&self, path: &PlannedPath) -> Option<AdcTrajectory> {
        let all_finite = path.stamp_s.is_finite()
            && path.point_dt_s.is_finite()
            && path
                .points
                .iter()
                .all(|p| p.x_m.is_finite() && p.y_m.is_finite() && p.speed_ms.is_finite());
        if !all_finite {
            return None;
        }

        let num_points = path.points.len();
        let mut trajectory_point: Vec<TrajectoryPoint> = Vec::with_capacity(num_points);
        let mut s_m = 0f64;
        let mut theta_rad = 0f64;

        for (i, point) in path.points.iter().enumerate() {
            if i > 0 {
                let prev = &path.points[i - 1];
                s_m += (point.x_m - prev.x_m).hypot(point.y_m - prev.y_m);
            }

            if let Some(next) = path.points.get(i + 1) {
                theta_rad = (next.y_m - point.y_m).atan2(next.x_m - point.x_m);
            }

            let a_mss = match path.points.get(i + 1) {
                Some(next) if path.point_dt_s > 0.0 => (next.speed_ms - point.speed_ms) / path.point_dt_s,
                _ => 0.0,
            };

            trajectory_point.push(TrajectoryPoint {
                path_point: PathPoint {
                    x_m: point.x_m,
                    y_m: point.y_m,
                    theta_rad,
                    kappa_m: 0.0,
                    s_m,
                },
                v_ms: point.speed_ms,
                a_mss,
                relative_time_s: i as f64 * path.point_dt_s,
            });
        }

        Some(AdcTrajectory {
            header: Header::new(path.stamp_s),
            trajectory_point,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

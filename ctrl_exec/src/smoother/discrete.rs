//! # Discrete points smoother
//!
//! Smooths the trajectory by repeated relaxation of each free point towards the midpoint of its
//! neighbours. After every pass the displacement of a point from its anchor is split into a
//! longitudinal part (along the anchor's heading) and a lateral part, and each is clamped to the
//! anchor's bound. Enforced points never move.
//!
//! Once the geometry has converged the heading, arc length and curvature of each point are
//! recomputed from the new positions. The time parametrisation (speed, acceleration, relative
//! time) is carried over from the raw trajectory unchanged.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector2;

use comms_if::msg::AdcTrajectory;
use util::maths::{clamp, wrap_to_pi};

use super::{SmootherError, TrajectorySmoother, TrajectorySmootherConfig};
use crate::anchor::AnchorPoint;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Distances below this are treated as coincident points.
const MIN_DIST_M: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DiscretePointsSmoother {
    config: TrajectorySmootherConfig,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DiscretePointsSmoother {
    pub fn new(config: TrajectorySmootherConfig) -> Self {
        Self { config }
    }

    /// Limit the candidate position to the box the anchor allows.
    fn constrain(anchor: &AnchorPoint, anchor_pos: &Vector2<f64>, candidate: Vector2<f64>) -> Vector2<f64> {
        let heading = anchor.path_point.theta_rad;
        let tangent = Vector2::new(heading.cos(), heading.sin());
        let normal = Vector2::new(-heading.sin(), heading.cos());

        let offset = candidate - anchor_pos;
        let lon_m = clamp(
            &offset.dot(&tangent),
            &-anchor.longitudinal_bound,
            &anchor.longitudinal_bound,
        );
        let lat_m = clamp(
            &offset.dot(&normal),
            &-anchor.lateral_bound,
            &anchor.lateral_bound,
        );

        anchor_pos + tangent * lon_m + normal * lat_m
    }
}

impl TrajectorySmoother for DiscretePointsSmoother {
    fn smooth(
        &mut self,
        anchor_points: &[AnchorPoint],
        raw_trajectory: &AdcTrajectory,
    ) -> Result<AdcTrajectory, SmootherError> {
        let num_points = raw_trajectory.num_points();
        if anchor_points.len() != num_points {
            return Err(SmootherError::AnchorMismatch {
                anchors: anchor_points.len(),
                points: num_points,
            });
        }
        if num_points < 2 {
            return Err(SmootherError::TooFewAnchors(num_points));
        }
        if let Some(i) = anchor_points.iter().position(|a| !a.path_point.is_finite()) {
            return Err(SmootherError::NonFinite(i));
        }

        let last = num_points - 1;
        let anchor_pos: Vec<Vector2<f64>> = anchor_points
            .iter()
            .map(|a| Vector2::new(a.path_point.x_m, a.path_point.y_m))
            .collect();

        // ---- RELAXATION ----

        let mut points = anchor_pos.clone();
        for _ in 0..self.config.max_iterations {
            let prev = points.clone();
            for i in 1..last {
                if anchor_points[i].enforced {
                    continue;
                }

                let mid = (prev[i - 1] + prev[i + 1]) * 0.5;
                let candidate = prev[i] + (mid - prev[i]) * self.config.smoothing_weight;
                points[i] = Self::constrain(&anchor_points[i], &anchor_pos[i], candidate);
            }
        }

        for (i, anchor) in anchor_points.iter().enumerate() {
            if anchor.enforced {
                points[i] = anchor_pos[i];
            }
        }

        // ---- DERIVED QUANTITIES ----

        // Central differences, one sided at the ends
        let neighbours = |i: usize| -> (usize, usize) {
            if i == 0 {
                (0, 1)
            } else if i == last {
                (last - 1, last)
            } else {
                (i - 1, i + 1)
            }
        };

        let headings: Vec<f64> = (0..num_points)
            .map(|i| {
                let (a, b) = neighbours(i);
                let d = points[b] - points[a];
                if d.norm() > MIN_DIST_M {
                    d[1].atan2(d[0])
                } else {
                    anchor_points[i].path_point.theta_rad
                }
            })
            .collect();

        let mut arc_lengths = vec![0f64; num_points];
        for i in 1..num_points {
            arc_lengths[i] = arc_lengths[i - 1] + (points[i] - points[i - 1]).norm();
        }

        let mut smoothed = AdcTrajectory {
            header: raw_trajectory.header,
            trajectory_point: raw_trajectory.trajectory_point.clone(),
        };

        for (i, point) in smoothed.trajectory_point.iter_mut().enumerate() {
            let (a, b) = neighbours(i);
            let ds = arc_lengths[b] - arc_lengths[a];

            point.path_point.x_m = points[i][0];
            point.path_point.y_m = points[i][1];
            point.path_point.theta_rad = headings[i];
            point.path_point.s_m = arc_lengths[i];
            point.path_point.kappa_m = if ds > MIN_DIST_M {
                wrap_to_pi(headings[b] - headings[a]) / ds
            } else {
                0.0
            };

            if !point.path_point.is_finite() {
                return Err(SmootherError::NonFinite(i));
            }
        }

        trace!(
            "Smoothed {} points over {} iterations",
            num_points,
            self.config.max_iterations
        );

        Ok(smoothed)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

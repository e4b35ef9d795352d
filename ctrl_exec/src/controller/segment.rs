//! Reference segment of a trajectory, and the tracking errors relative to it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Vector2, Vector3};
use serde::Serialize;

use comms_if::msg::AdcTrajectory;
use util::maths::{clamp, wrap_to_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Segments shorter than this are ignored.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A segment between two neighbouring trajectory points
#[derive(Debug, Default, Clone, Serialize)]
pub struct RefSegment {
    /// Index of the trajectory point the segment starts at
    pub start_index: usize,

    /// The start point of the segment
    pub start_m: Vector2<f64>,

    /// The target (end) point of the segment
    pub target_m: Vector2<f64>,

    /// The length of the segment
    pub length_m: f64,

    /// The heading (angle to the +ve x axis) of the segment
    pub heading_rad: f64,

    /// Unit vector pointing in the direction of the segment
    pub direction: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RefSegment {
    /// Build the segment from point `start_index` to the next one.
    ///
    /// Returns `None` if either point doesn't exist or the segment has no length.
    pub fn from_trajectory(trajectory: &AdcTrajectory, start_index: usize) -> Option<Self> {
        let start = trajectory.trajectory_point.get(start_index)?.path_point;
        let target = trajectory.trajectory_point.get(start_index + 1)?.path_point;

        let start_m = Vector2::new(start.x_m, start.y_m);
        let target_m = Vector2::new(target.x_m, target.y_m);

        let diff = target_m - start_m;
        let length_m = diff.norm();

        if !(length_m > MIN_SEGMENT_LENGTH_M) {
            return None;
        }

        Some(Self {
            start_index,
            start_m,
            target_m,
            length_m,
            heading_rad: diff[1].atan2(diff[0]),
            direction: diff / length_m,
        })
    }

    /// Find the segment of the trajectory closest to the given position.
    ///
    /// Distance to a segment is measured to the closest point on it, not to its infinite line.
    /// Returns `None` if the trajectory has no segment of non-zero length.
    pub fn closest(trajectory: &AdcTrajectory, position_m: &Vector2<f64>) -> Option<Self> {
        let num_segments = trajectory.num_points().saturating_sub(1);

        let mut best: Option<(f64, Self)> = None;
        for i in 0..num_segments {
            let seg = match Self::from_trajectory(trajectory, i) {
                Some(s) => s,
                None => continue,
            };

            let dist_m = seg.distance_to(position_m);

            // Strictly less, so that ties go to the earliest segment
            let is_better = match best {
                Some((d, _)) => dist_m < d,
                None => true,
            };
            if is_better {
                best = Some((dist_m, seg));
            }
        }

        best.map(|(_, s)| s)
    }

    /// Euclidian distance from the position to the closest point on the segment.
    pub fn distance_to(&self, position_m: &Vector2<f64>) -> f64 {
        let along_m = clamp(
            &(position_m - self.start_m).dot(&self.direction),
            &0.0,
            &self.length_m,
        );

        (position_m - (self.start_m + self.direction * along_m)).norm()
    }

    /// Calculate the lateral error to the segment's line.
    ///
    /// Lateral error will be positive if the vehicle is to the "left" of the segment, and negative
    /// if it's to the right (following right hand rule).
    pub fn lateral_error(&self, position_m: &Vector2<f64>) -> f64 {
        // The Z component of the cross product of the direction and start->position vectors is
        // the perpendicular distance, signed positive on the left.
        let offset = position_m - self.start_m;
        Vector3::new(self.direction[0], self.direction[1], 0.0)
            .cross(&Vector3::new(offset[0], offset[1], 0.0))[2]
    }

    /// Calculate the heading error to the segment.
    ///
    /// The heading error is +ve if the segment points to the left of the vehicle, i.e. a left
    /// turn is needed to align with it.
    pub fn heading_error(&self, heading_rad: f64) -> f64 {
        wrap_to_pi(self.heading_rad - heading_rad)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

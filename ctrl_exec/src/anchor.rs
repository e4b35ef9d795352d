//! # Anchor points
//!
//! Anchor points tell the smoother how far each point of the trajectory may be moved. The first
//! and last points are always enforced, i.e. the smoothed trajectory must pass through them
//! exactly, so that it starts and ends where planning asked it to.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::{AdcTrajectory, PathPoint};
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A trajectory point annotated with its allowed deviation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AnchorPoint {
    pub path_point: PathPoint,

    /// Maximum distance the smoothed point may move perpendicular to the path heading.
    ///
    /// Units: meters
    pub lateral_bound: f64,

    /// Maximum distance the smoothed point may move along the path heading.
    ///
    /// Units: meters
    pub longitudinal_bound: f64,

    /// If true the smoothed point must coincide with this anchor.
    pub enforced: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum AnchorError {
    /// The first and last points cannot be enforced on a trajectory this short.
    #[error("Cannot build anchor points from a trajectory with {0} point(s), at least 2 required")]
    TooFewPoints(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl AnchorPoint {
    pub fn new(path_point: PathPoint, lateral_bound: f64, longitudinal_bound: f64) -> Self {
        Self {
            path_point,
            lateral_bound,
            longitudinal_bound,
            enforced: false,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build one anchor point per trajectory point, all with the same bounds, enforcing the first and
/// last.
pub fn build_anchor_points(
    trajectory: &AdcTrajectory,
    lateral_bound: f64,
    longitudinal_bound: f64,
) -> Result<Vec<AnchorPoint>, AnchorError> {
    let num_points = trajectory.num_points();
    if num_points < 2 {
        return Err(AnchorError::TooFewPoints(num_points));
    }

    let mut anchors: Vec<AnchorPoint> = trajectory
        .trajectory_point
        .iter()
        .map(|p| AnchorPoint::new(p.path_point, lateral_bound, longitudinal_bound))
        .collect();

    anchors[0].enforced = true;
    anchors[num_points - 1].enforced = true;

    Ok(anchors)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::TrajectoryPoint;

    fn straight_trajectory(num_points: usize) -> AdcTrajectory {
        AdcTrajectory {
            trajectory_point: (0..num_points)
                .map(|i| TrajectoryPoint {
                    path_point: PathPoint::new(i as f64, 0.0),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoints_enforced() {
        for n in 2..8 {
            let anchors = build_anchor_points(&straight_trajectory(n), 0.2, 0.5).unwrap();

            assert_eq!(anchors.len(), n);
            for (i, a) in anchors.iter().enumerate() {
                assert_eq!(a.enforced, i == 0 || i == n - 1, "n = {}, i = {}", n, i);
                assert_eq!(a.lateral_bound, 0.2);
                assert_eq!(a.longitudinal_bound, 0.5);
                assert_eq!(a.path_point.x_m, i as f64);
            }
        }
    }

    #[test]
    fn test_too_few_points() {
        for n in 0..2 {
            match build_anchor_points(&straight_trajectory(n), 0.2, 0.5) {
                Err(AnchorError::TooFewPoints(k)) => assert_eq!(k, n),
                r => panic!("Expected TooFewPoints, got {:?}", r),
            }
        }
    }
}

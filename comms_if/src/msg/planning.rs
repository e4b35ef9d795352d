//! Planned trajectory message

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The trajectory the vehicle is expected to follow, as published by
/// planning.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdcTrajectory {
    pub header: Header,

    /// Ordered points of the trajectory, nearest first.
    pub trajectory_point: Vec<TrajectoryPoint>,
}

/// A point of the trajectory with its time parametrisation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub path_point: PathPoint,

    /// Target speed at this point.
    ///
    /// Units: meters/second
    pub v_ms: f64,

    /// Target acceleration at this point.
    ///
    /// Units: meters/second^2
    pub a_mss: f64,

    /// Time of arrival at this point, relative to the trajectory header.
    ///
    /// Units: seconds
    pub relative_time_s: f64,
}

/// Geometric part of a trajectory point.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Units: meters, Frame: LM
    pub x_m: f64,

    /// Units: meters, Frame: LM
    pub y_m: f64,

    /// Heading of the path at this point, right hand rule about LM_Z.
    ///
    /// Units: radians
    pub theta_rad: f64,

    /// Curvature of the path at this point, positive turning left.
    ///
    /// Units: 1/meters
    pub kappa_m: f64,

    /// Accumulated distance along the path from the first point.
    ///
    /// Units: meters
    pub s_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl AdcTrajectory {
    pub fn num_points(&self) -> usize {
        self.trajectory_point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory_point.is_empty()
    }
}

impl PathPoint {
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self {
            x_m,
            y_m,
            ..Default::default()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x_m.is_finite()
            && self.y_m.is_finite()
            && self.theta_rad.is_finite()
            && self.kappa_m.is_finite()
            && self.s_m.is_finite()
    }
}

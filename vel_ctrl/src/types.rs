//! Value types passed into and out of the velocity control law
//!
//! All types here are small `Copy` values built fresh every control tick.
//! Units follow the field suffixes: `_m` meters, `_rad` radians, `_ms`
//! meters/second and `_rads` radians/second. Every quantity is in the world
//! frame unless stated otherwise.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

// Internal
use crate::ControlLawError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position and heading of a robot in the world frame.
///
/// The heading is raw, i.e. not restricted to any particular range.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x_m: f64,
    pub y_m: f64,
    pub theta_rad: f64
}

/// The reference the robot should follow on this tick: a target pose plus
/// the target velocity at that pose.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    pub x_m: f64,
    pub y_m: f64,
    pub theta_rad: f64,
    pub x_dot_ms: f64,
    pub y_dot_ms: f64,
    pub theta_dot_rads: f64
}

/// Symmetric per-axis saturation limits on the velocity command.
///
/// All components are non-negative, which is checked on construction via
/// `new` or `from_slice`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityLimit {
    pub x_dot_max_ms: f64,
    pub y_dot_max_ms: f64,
    pub theta_dot_max_rads: f64
}

/// Velocity command produced by the control law.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub x_dot_ms: f64,
    pub y_dot_ms: f64,
    pub theta_dot_rads: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Proportional feedback gain.
///
/// Units are (m/s)/m on the linear axes and (rad/s)/rad on the angular axis.
/// In parameter files this is either a single float or a 3 element array.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gain {
    /// The same gain on every axis.
    Scalar(f64),

    /// Per-axis gains, in x, y, theta order.
    Diagonal([f64; 3])
}

/// The frame the velocity command is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmdFrame {
    /// The command is left in the world frame.
    World,

    /// The command is rotated into the robot's body frame before saturation.
    Body
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2D {
    pub fn new(x_m: f64, y_m: f64, theta_rad: f64) -> Self {
        Self { x_m, y_m, theta_rad }
    }

    /// Build from `[x, y, theta]`.
    pub fn from_slice(s: &[f64]) -> Result<Self, ControlLawError> {
        let [x_m, y_m, theta_rad] = exactly_3("position", s)?;
        Ok(Self { x_m, y_m, theta_rad })
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x_m, self.y_m, self.theta_rad)
    }

    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

impl DesiredState {
    /// Build from `[x, y, theta, x_dot, y_dot, theta_dot]`.
    pub fn from_slice(s: &[f64]) -> Result<Self, ControlLawError> {
        if s.len() != 6 {
            return Err(ControlLawError::InvalidInput(format!(
                "desired_state must have 6 components, found {}",
                s.len()
            )));
        }

        Ok(Self {
            x_m: s[0],
            y_m: s[1],
            theta_rad: s[2],
            x_dot_ms: s[3],
            y_dot_ms: s[4],
            theta_dot_rads: s[5]
        })
    }

    /// The reference pose component.
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x_m, self.y_m, self.theta_rad)
    }

    /// The reference velocity component as a vector.
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.x_dot_ms, self.y_dot_ms, self.theta_dot_rads)
    }

    pub fn is_finite(&self) -> bool {
        self.pose().is_finite() && self.velocity().iter().all(|v| v.is_finite())
    }
}

impl VelocityLimit {
    /// Create a new limit, rejecting negative components.
    pub fn new(
        x_dot_max_ms: f64,
        y_dot_max_ms: f64,
        theta_dot_max_rads: f64
    ) -> Result<Self, ControlLawError> {
        let limit = Self { x_dot_max_ms, y_dot_max_ms, theta_dot_max_rads };
        limit.validate()?;
        Ok(limit)
    }

    /// Build from `[x_dot_max, y_dot_max, theta_dot_max]`.
    pub fn from_slice(s: &[f64]) -> Result<Self, ControlLawError> {
        let [x, y, theta] = exactly_3("vel_limit", s)?;
        Self::new(x, y, theta)
    }

    /// Check that no component is negative.
    ///
    /// NaN limits are not negative and are left for the non-finite check.
    pub fn validate(&self) -> Result<(), ControlLawError> {
        for (i, l) in self.to_vector().iter().enumerate() {
            if *l < 0.0 {
                return Err(ControlLawError::InvalidInput(format!(
                    "vel_limit[{}] must be non-negative, found {}",
                    i, l
                )));
            }
        }

        Ok(())
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x_dot_max_ms, self.y_dot_max_ms, self.theta_dot_max_rads)
    }

    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

impl VelocityCommand {
    pub fn new(x_dot_ms: f64, y_dot_ms: f64, theta_dot_rads: f64) -> Self {
        Self { x_dot_ms, y_dot_ms, theta_dot_rads }
    }

    /// A command which stops the robot.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x_dot_ms, self.y_dot_ms, self.theta_dot_rads)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x_dot_ms, self.y_dot_ms, self.theta_dot_rads]
    }
}

impl From<Vector3<f64>> for VelocityCommand {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Gain {
    /// Build from a 1 element (scalar) or 3 element (diagonal) slice.
    pub fn from_slice(s: &[f64]) -> Result<Self, ControlLawError> {
        match *s {
            [k] => Ok(Gain::Scalar(k)),
            [kx, ky, kt] => Ok(Gain::Diagonal([kx, ky, kt])),
            _ => Err(ControlLawError::InvalidInput(format!(
                "gain must have 1 or 3 components, found {}",
                s.len()
            )))
        }
    }

    /// The per-axis gains.
    pub fn diagonal(&self) -> Vector3<f64> {
        match *self {
            Gain::Scalar(k) => Vector3::repeat(k),
            Gain::Diagonal(k) => Vector3::new(k[0], k[1], k[2])
        }
    }

    /// The gain matrix, `k * I` for a scalar or `diag(k)` otherwise.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&self.diagonal())
    }

    pub fn is_finite(&self) -> bool {
        self.diagonal().iter().all(|v| v.is_finite())
    }
}

impl Default for CmdFrame {
    fn default() -> Self {
        CmdFrame::World
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn exactly_3(name: &str, s: &[f64]) -> Result<[f64; 3], ControlLawError> {
    match *s {
        [a, b, c] => Ok([a, b, c]),
        _ => Err(ControlLawError::InvalidInput(format!(
            "{} must have 3 components, found {}",
            name,
            s.len()
        )))
    }
}

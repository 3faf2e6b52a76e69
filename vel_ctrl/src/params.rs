//! Velocity control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::{CmdFrame, ControlLawError, Gain, VelocityLimit};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for velocity control
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Params {

    /// Feedback proportional gain.
    ///
    /// Either a single value applied to every axis or an `[x, y, theta]`
    /// array.
    ///
    /// Units: (m/s)/m for x and y, (rad/s)/rad for theta
    pub gain: Gain,

    /// Maximum absolute x velocity demand.
    ///
    /// Units: meters/second
    pub x_dot_max_ms: f64,

    /// Maximum absolute y velocity demand.
    ///
    /// Units: meters/second
    pub y_dot_max_ms: f64,

    /// Maximum absolute angular velocity demand.
    ///
    /// Units: radians/second
    pub theta_dot_max_rads: f64,

    /// The frame to express the velocity command in, defaults to `World`.
    #[serde(default)]
    pub output_frame: CmdFrame
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {

    /// The velocity limits held in these parameters.
    pub fn vel_limit(&self) -> VelocityLimit {
        VelocityLimit {
            x_dot_max_ms: self.x_dot_max_ms,
            y_dot_max_ms: self.y_dot_max_ms,
            theta_dot_max_rads: self.theta_dot_max_rads
        }
    }

    /// Check that the limits and gain are usable by the control law.
    pub fn validate(&self) -> Result<(), ControlLawError> {
        let vel_limit = self.vel_limit();
        vel_limit.validate()?;

        if !vel_limit.is_finite() {
            return Err(ControlLawError::NonFiniteInput("vel_limit"));
        }
        if !self.gain.is_finite() {
            return Err(ControlLawError::NonFiniteInput("gain"));
        }

        Ok(())
    }
}

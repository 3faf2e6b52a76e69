//! # Velocity control law
//!
//! Proportional trajectory tracking in planar pose space:
//!
//! ```text
//! e       = q - q_desired             (heading component wrapped to [-pi, pi))
//! u_world = q_dot_desired - K e
//! vel_cmd = clip(u_world, -vel_limit, vel_limit)
//! ```
//!
//! The law is a pure function of its arguments. It keeps no state between
//! calls and may be evaluated from any number of threads at once.
//!
//! The documented algorithm rotates `u_world` into the robot's body frame with
//! `rot_mat_z(-theta)` before saturating. The deployed behaviour leaves the
//! command in the world frame and `evaluate` reproduces that. Body frame
//! output is only produced when `CmdFrame::Body` is requested explicitly via
//! `evaluate_in_frame`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;
use thiserror::Error;

// Internal
use crate::types::*;
use util::maths::{clamp, rot_mat_z, wrap_to_pi};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can be raised by the control law.
///
/// No partial computation is performed before any of these are raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlLawError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Non-finite component in {0}")]
    NonFiniteInput(&'static str)
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A full evaluation of the control law, including intermediate terms.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Pose error `position - desired`, with the heading wrapped.
    pub pose_error: Vector3<f64>,

    /// True if the raw heading error was outside [-pi, pi) and was wrapped.
    pub heading_wrapped: bool,

    /// Feedforward plus feedback velocity before saturation, in the output
    /// frame.
    pub unsat_cmd: Vector3<f64>,

    /// The saturated command.
    pub vel_cmd: VelocityCommand,

    /// Which axes were clamped by saturation.
    pub saturated: [bool; 3]
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Evaluate the control law, returning the world frame velocity command.
pub fn evaluate(
    desired_state: &DesiredState,
    position: &Pose2D,
    vel_limit: &VelocityLimit,
    gain: &Gain
) -> Result<VelocityCommand, ControlLawError> {
    evaluate_in_frame(desired_state, position, vel_limit, gain, CmdFrame::World)
        .map(|e| e.vel_cmd)
}

/// Evaluate the control law with the command expressed in `frame`.
///
/// `CmdFrame::World` matches `evaluate` exactly and never touches the
/// rotation. `CmdFrame::Body` rotates the unsaturated command by the negated
/// robot heading, so saturation then applies to body axes.
pub fn evaluate_in_frame(
    desired_state: &DesiredState,
    position: &Pose2D,
    vel_limit: &VelocityLimit,
    gain: &Gain,
    frame: CmdFrame
) -> Result<Evaluation, ControlLawError> {
    validate(desired_state, position, vel_limit, gain)?;

    let (pose_error, heading_wrapped) = pose_error(desired_state, position);

    let u_world = desired_state.velocity() - gain.matrix() * pose_error;

    let unsat_cmd = match frame {
        CmdFrame::World => u_world,
        CmdFrame::Body => rot_mat_z(-position.theta_rad) * u_world
    };

    let (vel_cmd, saturated) = saturate(&unsat_cmd, vel_limit);

    Ok(Evaluation {
        pose_error,
        heading_wrapped,
        unsat_cmd,
        vel_cmd,
        saturated
    })
}

/// Evaluate the control law on raw component slices.
///
/// - `desired_state`: `[x, y, theta, x_dot, y_dot, theta_dot]`
/// - `position`: `[x, y, theta]`
/// - `vel_limit`: `[x_dot_max, y_dot_max, theta_dot_max]`
/// - `gain`: `[k]` or `[k_x, k_y, k_theta]`
///
/// Returns `[x_dot, y_dot, theta_dot]` in the world frame.
pub fn control_law(
    desired_state: &[f64],
    position: &[f64],
    vel_limit: &[f64],
    gain: &[f64]
) -> Result<[f64; 3], ControlLawError> {
    let desired_state = DesiredState::from_slice(desired_state)?;
    let position = Pose2D::from_slice(position)?;
    let vel_limit = VelocityLimit::from_slice(vel_limit)?;
    let gain = Gain::from_slice(gain)?;

    evaluate(&desired_state, &position, &vel_limit, &gain).map(|c| c.to_array())
}

/// Compute the pose error `position - desired`, wrapping the heading error.
///
/// Returns the error and whether the heading needed wrapping.
pub fn pose_error(desired_state: &DesiredState, position: &Pose2D) -> (Vector3<f64>, bool) {
    let mut error = position.to_vector() - desired_state.pose().to_vector();

    let raw_head_err_rad = error[2];
    error[2] = wrap_to_pi(raw_head_err_rad);

    (error, error[2] != raw_head_err_rad)
}

/// Saturate each axis of `cmd` independently to `[-limit, limit]`.
pub fn saturate(cmd: &Vector3<f64>, vel_limit: &VelocityLimit) -> (VelocityCommand, [bool; 3]) {
    let limit = vel_limit.to_vector();
    let mut saturated = [false; 3];

    let clamped = Vector3::from_fn(|i, _| {
        let c = clamp(cmd[i], -limit[i], limit[i]);
        saturated[i] = c != cmd[i];
        c
    });

    (VelocityCommand::from(clamped), saturated)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn validate(
    desired_state: &DesiredState,
    position: &Pose2D,
    vel_limit: &VelocityLimit,
    gain: &Gain
) -> Result<(), ControlLawError> {
    vel_limit.validate()?;

    if !desired_state.is_finite() {
        return Err(ControlLawError::NonFiniteInput("desired_state"));
    }
    if !position.is_finite() {
        return Err(ControlLawError::NonFiniteInput("position"));
    }
    if !vel_limit.is_finite() {
        return Err(ControlLawError::NonFiniteInput("vel_limit"));
    }
    if !gain.is_finite() {
        return Err(ControlLawError::NonFiniteInput("gain"));
    }

    Ok(())
}

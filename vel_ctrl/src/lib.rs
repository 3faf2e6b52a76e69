//! # Velocity control library.
//!
//! Computes the feedback velocity command that drives a ground robot onto a
//! time-varying reference trajectory. The law itself lives in
//! [`control_law`], the cyclic [`VelCtrl`] module wraps it with parameters,
//! status reporting and archiving for use inside a fixed-rate control loop.
//!
//! Estimation, trajectory generation and actuation are provided by other
//! parts of the swarm stack and only meet this crate through its inputs and
//! outputs.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// The control law - a pure function from reference and pose to velocity command
pub mod control_law;

/// Velocity control parameters - gain, limits and output frame
pub mod params;

/// Cyclic module state - wraps the control law for the control loop
pub mod state;

/// Value types passed into and out of the control law
pub mod types;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use control_law::{control_law, evaluate, evaluate_in_frame, ControlLawError, Evaluation};
pub use params::Params;
pub use state::*;
pub use types::*;

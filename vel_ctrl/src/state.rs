//! Implementations for the VelCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{
    control_law, ControlLawError, DesiredState, Params, Pose2D, VelocityCommand,
    VelocityLimit,
};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity control module state
#[derive(Default)]
pub struct VelCtrl {

    pub(crate) params: Option<Params>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) input: Option<InputData>,
    arch_input: Archiver,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver
}

/// Input data to Velocity Control.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct InputData {
    /// The reference for this cycle, from the trajectory source.
    pub desired_state: DesiredState,

    /// The current robot pose, from the estimator.
    pub pose: Pose2D
}

/// Output command from VelCtrl for the actuation layer.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct OutputData {
    /// The saturated velocity command.
    pub vel_cmd: VelocityCommand
}

/// Status report for VelCtrl processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Pose error along x.
    ///
    /// Units: meters
    pub x_error_m: f64,

    /// Pose error along y.
    ///
    /// Units: meters
    pub y_error_m: f64,

    /// Wrapped heading error.
    ///
    /// Units: radians
    pub head_error_rad: f64,

    /// True if the raw heading error crossed the +/-pi boundary.
    pub head_error_wrapped: bool,

    pub x_dot_limited: bool,
    pub y_dot_limited: bool,
    pub theta_dot_limited: bool
}

/// Possible errors that can occur during VelCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum VelCtrlInitError {
    #[error("Could not load the parameters: {0}")]
    ParamLoadError(#[from] params::LoadError),

    #[error("Parameters are not valid: {0}")]
    InvalidParams(ControlLawError),

    #[error("Could not create the archive files: {0}")]
    ArchiveError(String)
}

/// Possible errors that can occur during VelCtrl processing.
#[derive(Debug, thiserror::Error)]
pub enum VelCtrlError {
    #[error("VelCtrl has not been initialised")]
    NotInitialised,

    #[error("Control law evaluation failed: {0}")]
    ControlLawError(#[from] ControlLawError)
}

/// Flat archive row for the input, csv cannot nest structs.
#[derive(Serialize)]
struct InputRecord {
    time_s: f64,
    desired_x_m: f64,
    desired_y_m: f64,
    desired_theta_rad: f64,
    desired_x_dot_ms: f64,
    desired_y_dot_ms: f64,
    desired_theta_dot_rads: f64,
    pose_x_m: f64,
    pose_y_m: f64,
    pose_theta_rad: f64
}

#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    x_dot_ms: f64,
    y_dot_ms: f64,
    theta_dot_rads: f64
}

#[derive(Serialize)]
struct ReportRecord {
    time_s: f64,
    x_error_m: f64,
    y_error_m: f64,
    head_error_rad: f64,
    head_error_wrapped: bool,
    x_dot_limited: bool,
    y_dot_limited: bool,
    theta_dot_limited: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelCtrl {

    /// Create an initialised module from the given parameters.
    ///
    /// Archiving is disabled for modules created this way.
    pub fn new(params: Params) -> Result<Self, VelCtrlInitError> {
        params.validate().map_err(VelCtrlInitError::InvalidParams)?;

        Ok(Self {
            params: Some(params),
            ..Default::default()
        })
    }

    /// The loaded parameters, if the module is initialised.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// The velocity limits in use.
    pub fn vel_limit(&self) -> Option<VelocityLimit> {
        self.params.as_ref().map(|p| p.vel_limit())
    }
}

impl State for VelCtrl {
    type InitData = &'static str;
    type InitError = VelCtrlInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = VelCtrlError;

    /// Initialise the VelCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data)?;
        params.validate().map_err(VelCtrlInitError::InvalidParams)?;
        self.params = Some(params);

        let arch = |path: &str| Archiver::from_path(session, path)
            .map_err(|e| VelCtrlInitError::ArchiveError(e.to_string()));

        self.arch_report = arch("vel_ctrl/status_report.csv")?;
        self.arch_input = arch("vel_ctrl/input.csv")?;
        self.arch_output = arch("vel_ctrl/output.csv")?;

        Ok(())
    }

    /// Perform cyclic processing of Velocity Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report and outputs, a failed cycle must not leave
        // the previous command looking current
        self.report = StatusReport::default();
        self.output = None;
        self.input = Some(*input_data);

        let params = self.params.as_ref().ok_or(VelCtrlError::NotInitialised)?;

        let eval = match control_law::evaluate_in_frame(
            &input_data.desired_state,
            &input_data.pose,
            &params.vel_limit(),
            &params.gain,
            params.output_frame
        ) {
            Ok(e) => e,
            Err(e) => {
                warn!("Velocity control law rejected its inputs: {}", e);
                return Err(e.into());
            }
        };

        self.report = StatusReport {
            x_error_m: eval.pose_error[0],
            y_error_m: eval.pose_error[1],
            head_error_rad: eval.pose_error[2],
            head_error_wrapped: eval.heading_wrapped,
            x_dot_limited: eval.saturated[0],
            y_dot_limited: eval.saturated[1],
            theta_dot_limited: eval.saturated[2]
        };

        if eval.heading_wrapped {
            debug!(
                "VelCtrl heading error wrapped across +/-pi to {:.4} rad",
                eval.pose_error[2]
            );
        }

        if eval.saturated.iter().any(|s| *s) {
            trace!(
                "VelCtrl saturated {:?}, unsaturated demand {:?}",
                eval.saturated,
                eval.unsat_cmd.as_slice()
            );
        }

        let output = OutputData {
            vel_cmd: eval.vel_cmd
        };

        trace!("VelCtrl output: {:?}", output.vel_cmd);

        self.output = Some(output);

        Ok((output, self.report))
    }

    /// Stop the robot.
    fn fail_safe_output(&self) -> Self::OutputData {
        OutputData {
            vel_cmd: VelocityCommand::zero()
        }
    }
}

impl Archived for VelCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let time_s = session::get_elapsed_seconds();

        if let Some(i) = self.input {
            self.arch_input.serialise(InputRecord {
                time_s,
                desired_x_m: i.desired_state.x_m,
                desired_y_m: i.desired_state.y_m,
                desired_theta_rad: i.desired_state.theta_rad,
                desired_x_dot_ms: i.desired_state.x_dot_ms,
                desired_y_dot_ms: i.desired_state.y_dot_ms,
                desired_theta_dot_rads: i.desired_state.theta_dot_rads,
                pose_x_m: i.pose.x_m,
                pose_y_m: i.pose.y_m,
                pose_theta_rad: i.pose.theta_rad
            })?;
        }

        if let Some(o) = self.output {
            self.arch_output.serialise(OutputRecord {
                time_s,
                x_dot_ms: o.vel_cmd.x_dot_ms,
                y_dot_ms: o.vel_cmd.y_dot_ms,
                theta_dot_rads: o.vel_cmd.theta_dot_rads
            })?;
        }

        let r = self.report;
        self.arch_report.serialise(ReportRecord {
            time_s,
            x_error_m: r.x_error_m,
            y_error_m: r.y_error_m,
            head_error_rad: r.head_error_rad,
            head_error_wrapped: r.head_error_wrapped,
            x_dot_limited: r.x_dot_limited,
            y_dot_limited: r.y_dot_limited,
            theta_dot_limited: r.theta_dot_limited
        })?;

        Ok(())
    }
}

//! # Velocity Control Test
//!
//! This binary runs the velocity control module in closed loop against a
//! simulated holonomic robot following a circular reference, without needing
//! the estimator, trajectory source or robot driver. It is designed to allow
//! quick tuning of the gain and limits in `params/vel_ctrl.toml`.
//!
//! Usage: `vel_ctrl_test [duration_s]`

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    env, thread,
    time::{Duration, Instant},
};

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};
use serde::Serialize;

use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    maths::{rot_mat_z, wrap_to_pi},
    module::State,
    session::Session,
};
use vel_ctrl_lib::{CmdFrame, DesiredState, InputData, Pose2D, VelCtrl, VelocityCommand};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.05;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Duration of the test if none is given on the command line.
const DEFAULT_DURATION_S: f64 = 20.0;

/// Radius of the reference circle.
const REF_RADIUS_M: f64 = 1.0;

/// Angular rate of the reference around the circle.
const REF_RATE_RADS: f64 = 0.5;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Summary of the run, saved into the session at exit.
#[derive(Debug, Default, Serialize)]
struct Summary {
    num_cycles: u64,
    num_errors: u64,
    num_saturated_cycles: u64,
    num_wrapped_cycles: u64,
    final_pos_error_m: f64,
    final_head_error_rad: f64,
    max_pos_error_last_half_m: f64
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("vel_ctrl_test", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Velocity Control Test\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- ARGUMENTS ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let duration_s = match args.len() {
        1 => DEFAULT_DURATION_S,
        2 => args[1]
            .parse::<f64>()
            .wrap_err("Expected the test duration in seconds as the only argument")?,
        _ => return Err(eyre!("Expected at most one argument, the test duration in seconds")),
    };
    let num_cycles = (duration_s * CYCLE_FREQUENCY_HZ).ceil() as u64;

    // ---- MODULE INIT ----

    let mut vel_ctrl = VelCtrl::default();
    vel_ctrl
        .init("vel_ctrl.toml", &session)
        .wrap_err("Failed to initialise VelCtrl")?;
    info!("VelCtrl init complete");

    let output_frame = vel_ctrl
        .params()
        .map(|p| p.output_frame)
        .unwrap_or_default();
    info!("VelCtrl params: {:?}", vel_ctrl.params());

    // Start off the circle, facing the wrong way
    let mut pose = Pose2D::new(1.5, -0.5, 0.0);

    // ---- MAIN LOOP ----

    info!("Begining main loop, running {} cycles\n", num_cycles);

    let mut summary = Summary::default();

    for cycle in 0..num_cycles {
        let cycle_start_instant = Instant::now();
        let sim_time_s = cycle as f64 * CYCLE_PERIOD_S;

        // ---- CONTROL PROCESSING ----

        let input = InputData {
            desired_state: circle_reference(sim_time_s),
            pose,
        };

        let vel_cmd = match vel_ctrl.proc(&input) {
            Ok((output, report)) => {
                if report.x_dot_limited || report.y_dot_limited || report.theta_dot_limited {
                    summary.num_saturated_cycles += 1;
                }
                if report.head_error_wrapped {
                    summary.num_wrapped_cycles += 1;
                }

                let pos_err_m = report.x_error_m.hypot(report.y_error_m);
                if sim_time_s >= duration_s / 2.0 {
                    summary.max_pos_error_last_half_m =
                        summary.max_pos_error_last_half_m.max(pos_err_m);
                }
                summary.final_pos_error_m = pos_err_m;
                summary.final_head_error_rad = report.head_error_rad;

                output.vel_cmd
            }
            Err(e) => {
                warn!("VelCtrl error, commanding fail safe output: {}", e);
                summary.num_errors += 1;
                vel_ctrl.fail_safe_output().vel_cmd
            }
        };

        if let Err(e) = vel_ctrl.write() {
            warn!("Could not write VelCtrl archives: {}", e);
        }

        if cycle % (CYCLE_FREQUENCY_HZ as u64) == 0 {
            info!(
                "t = {:6.2} s, pose = ({:+.3}, {:+.3}, {:+.3}), cmd = ({:+.3}, {:+.3}, {:+.3})",
                sim_time_s,
                pose.x_m,
                pose.y_m,
                pose.theta_rad,
                vel_cmd.x_dot_ms,
                vel_cmd.y_dot_ms,
                vel_cmd.theta_dot_rads
            );
        }

        // ---- SIMULATION PROCESSING ----

        pose = integrate_pose(pose, vel_cmd, output_frame);
        summary.num_cycles += 1;

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }

    info!("Run complete: {:#?}", summary);
    session.save("vel_ctrl/summary.json", summary);

    session.exit();

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The reference at the given time: a counter-clockwise circle about the
/// origin with the heading along the tangent.
///
/// The heading is left unwrapped so the control law sees it grow past pi.
fn circle_reference(time_s: f64) -> DesiredState {
    let angle_rad = REF_RATE_RADS * time_s;
    let (s, c) = angle_rad.sin_cos();

    DesiredState {
        x_m: REF_RADIUS_M * c,
        y_m: REF_RADIUS_M * s,
        theta_rad: angle_rad + std::f64::consts::FRAC_PI_2,
        x_dot_ms: -REF_RADIUS_M * REF_RATE_RADS * s,
        y_dot_ms: REF_RADIUS_M * REF_RATE_RADS * c,
        theta_dot_rads: REF_RATE_RADS,
    }
}

/// Move a holonomic robot by one cycle of the given command.
fn integrate_pose(pose: Pose2D, vel_cmd: VelocityCommand, frame: CmdFrame) -> Pose2D {
    let vel_world = match frame {
        CmdFrame::World => vel_cmd.to_vector(),
        CmdFrame::Body => rot_mat_z(pose.theta_rad) * vel_cmd.to_vector(),
    };

    Pose2D::new(
        pose.x_m + vel_world[0] * CYCLE_PERIOD_S,
        pose.y_m + vel_world[1] * CYCLE_PERIOD_S,
        wrap_to_pi(pose.theta_rad + vel_world[2] * CYCLE_PERIOD_S),
    )
}

//! Main steering control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the controller interface
//!     - Main loop, once per cycle:
//!         - Acquire the cycle's input frame
//!         - Run the control pipeline
//!         - Report the steering command
//!
//! # Usage
//!
//! `ctrl_exec [REPLAY_FILE]`
//!
//! With a replay file the frames in it are run one per cycle. Without one a synthetic straight
//! line scenario is run instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use ctrl_lib::{
    adapter::BridgeAdapter,
    interface::ControllerInterface,
    params::CtrlParams,
    replay::{frame_to_input, ReplaySource},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of frames in the synthetic scenario.
const SYNTH_NUM_FRAMES: usize = 200;

/// Lateral offset of the vehicle at the start of the synthetic scenario.
const SYNTH_LATERAL_OFFSET_M: f64 = 0.5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Steering Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: CtrlParams =
        util::params::load("ctrl.toml").wrap_err("Could not load control params")?;
    let cycle_period_s = params.cycle_period_s;

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SOURCE ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut source = if args.len() == 2 {
        info!("Loading replay from \"{}\"", &args[1]);

        ReplaySource::from_path(&args[1]).wrap_err("Failed to load the replay file")?
    } else if args.len() == 1 {
        info!("No replay file provided, running the synthetic scenario");

        ReplaySource::synthetic(
            SYNTH_NUM_FRAMES,
            session::get_elapsed_seconds(),
            cycle_period_s,
            SYNTH_LATERAL_OFFSET_M,
        )
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    };

    info!(
        "Replay lasts {:.02} s and contains {} frames\n",
        source.duration_s(),
        source.num_frames()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ctrl_if = ControllerInterface::new(BridgeAdapter);
    ctrl_if
        .init(params)
        .wrap_err("Failed to initialise the ControllerInterface")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_cycles: u64 = 0;
    let mut num_failed_cycles: u64 = 0;

    while let Some(frame) = source.next_frame() {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- CONTROL PROCESSING ----

        match ctrl_if.proc(&frame_to_input(frame)) {
            Ok((output, report)) => {
                info!(
                    "Steering angle: {:+.4} (target {:+.2})",
                    output.steering_angle, output.command.steering_target
                );

                if let Some(ref e) = report.input_status {
                    warn!("Cycle ran with invalid inputs: {}", e);
                }

                match serde_json::to_string(&output.command) {
                    Ok(s) => debug!("Control command: {}", s),
                    Err(e) => warn!("Could not serialise the control command: {}", e),
                }
            }
            Err(e) => {
                // The pipeline already logged the failure, just count it.
                debug!("Cycle failed ({:?}): {}", e.kind(), e);
                num_failed_cycles += 1;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period_s
            ),
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!(
        "End of replay, {} cycles run, {} failed",
        num_cycles, num_failed_cycles
    );

    Ok(())
}

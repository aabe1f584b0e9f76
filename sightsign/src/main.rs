//! SightSign - signature retracing arm console
//!
//! Loads a signature and replays it on a uArm, stroke by stroke, with the
//! operator pressing Enter to continue after each stroke. Also runs the
//! calibration routines and lists candidate serial ports.
//!
//! Logging goes to stderr, filtered by `RUST_LOG` (default `info`).

use std::env;
use std::io;
use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::Context;
use sightsign_core::config::{Backend, Settings};
use sightsign_core::{Arm, ArmController, SettingsSink, Stroke};
use sightsign_drivers::{BriefArm, Loopback, StdDelay, SwiftArm};
use sightsign_hal_serialport::{find_arm_port, list_ports, HostSerial};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod session;
mod strokes;
mod tasks;

use crate::cli::{Action, Cli, Command, USAGE};
use crate::config::{load_settings, settings_sink};
use crate::session::Session;
use crate::strokes::load_strokes;
use crate::tasks::spawn_stdin;

/// Port name reported by the in-memory link
const DRY_RUN_PORT: &str = "loopback";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match cli::parse_args(env::args().skip(1)) {
        Ok(Action::Help) => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Action::Run(cli)) => match run(cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.command == Command::Ports {
        print_ports();
        return Ok(());
    }

    let settings = load_settings(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    let strokes = match cli.command.stroke_file() {
        Some(path) => load_strokes(path)?,
        None => Vec::new(),
    };
    let sink = settings_sink(cli.config.clone());
    let backend = settings.arm.backend;

    if cli.dry_run {
        let link = Loopback::new();
        let port = Some(DRY_RUN_PORT.to_owned());
        let result = match backend {
            Backend::Brief => drive(
                BriefArm::new(link.clone(), port, StdDelay),
                settings,
                sink,
                &cli.command,
                strokes,
            ),
            Backend::Swift => drive(
                SwiftArm::new(link.clone(), port),
                settings,
                sink,
                &cli.command,
                strokes,
            ),
        };
        info!("dry run wrote {} bytes", link.written().len());
        return result;
    }

    let port = settings.arm.port.clone().or_else(find_arm_port);
    match backend {
        Backend::Brief => drive(
            BriefArm::new(HostSerial, port, StdDelay),
            settings,
            sink,
            &cli.command,
            strokes,
        ),
        Backend::Swift => drive(
            SwiftArm::new(HostSerial, port),
            settings,
            sink,
            &cli.command,
            strokes,
        ),
    }
}

/// Run one command against `arm`, releasing it afterwards
fn drive<A: Arm>(
    arm: A,
    settings: Settings,
    sink: SettingsSink,
    command: &Command,
    strokes: Vec<Stroke>,
) -> anyhow::Result<()> {
    let mut controller = ArmController::new(arm, settings).with_settings_sink(sink);
    if controller.settings().arm.robot_control {
        controller.connect();
    } else {
        info!("robot control is off, the arm will not move");
    }

    let (tx, rx) = mpsc::sync_channel(0);
    let mut session = Session::new(controller, tx.clone(), rx);

    let result = match command {
        Command::Write(_) | Command::Stamp(_) => spawn_stdin(tx)
            .context("starting operator input")
            .and_then(|_| session.play(strokes, matches!(command, Command::Stamp(_)))),
        Command::Circle => session.circle(),
        Command::Corners(_) => session.corners(&strokes),
        Command::Home => session.home(),
        Command::Ports => Ok(()),
    };

    session.close();
    result
}

fn print_ports() {
    let ports = list_ports();
    if ports.is_empty() {
        println!("no serial ports found");
        return;
    }
    for (info, arm) in ports {
        match arm {
            Some(arm) => println!("{}  {}", info.port_name, arm.name),
            None => println!("{}", info.port_name),
        }
    }
}

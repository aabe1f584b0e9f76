//! Command line parsing

use std::path::PathBuf;

use crate::config::DEFAULT_SETTINGS_PATH;

pub const USAGE: &str = "\
Usage: sightsign [OPTIONS] <COMMAND>

Commands:
  write <FILE>    Write a signature, pausing after each stroke for Enter
  stamp <FILE>    Write a signature without pausing
  circle          Draw the calibration circle
  corners <FILE>  Dot the corners of a signature's bounding box
  home            Lift the pen and park the arm
  ports           List serial ports and recognised arms

Options:
  -c, --config <PATH>  Settings file [default: sightsign.toml]
      --dry-run        Drive an in-memory link instead of a serial port
  -h, --help           Print this help message

While a signature plays: Enter continues, +/- trims pen height, q stops.";

/// What to do with the arm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Write(PathBuf),
    Stamp(PathBuf),
    Circle,
    Corners(PathBuf),
    Home,
    Ports,
}

impl Command {
    /// Stroke file the command reads, if any
    pub fn stroke_file(&self) -> Option<&PathBuf> {
        match self {
            Command::Write(path) | Command::Stamp(path) | Command::Corners(path) => Some(path),
            Command::Circle | Command::Home | Command::Ports => None,
        }
    }
}

/// Parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    pub config: PathBuf,
    pub dry_run: bool,
}

pub enum Action {
    Run(Cli),
    Help,
}

/// Parse arguments (without the program name)
pub fn parse_args<I>(args: I) -> Result<Action, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = PathBuf::from(DEFAULT_SETTINGS_PATH);
    let mut dry_run = false;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Action::Help),
            "--dry-run" => dry_run = true,
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| format!("{arg} needs a path\n\n{USAGE}"))?;
                config = PathBuf::from(path);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option {flag}\n\n{USAGE}"))
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.as_slice() {
        [cmd, file] if cmd == "write" => Command::Write(file.into()),
        [cmd, file] if cmd == "stamp" => Command::Stamp(file.into()),
        [cmd, file] if cmd == "corners" => Command::Corners(file.into()),
        [cmd] if cmd == "circle" => Command::Circle,
        [cmd] if cmd == "home" => Command::Home,
        [cmd] if cmd == "ports" => Command::Ports,
        _ => return Err(USAGE.into()),
    };

    Ok(Action::Run(Cli {
        command,
        config,
        dry_run,
    }))
}

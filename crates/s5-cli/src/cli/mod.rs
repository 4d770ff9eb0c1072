mod commands;
mod helpers;

use clap::Parser;
use s5_core::domain::{S5Error, S5ErrorCategory};
use s5_core::profile::ShaperConfigError;

pub use helpers::init_logging;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("s5".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "s5", version, about = "Solar car strategy file and profile tools")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Print a field document's zone line and check it against the row count
    Zone(commands::ZoneArgs),
    /// Rescale a velocity template to a target mean and write the result
    Shape(commands::ShapeArgs),
    /// Write a two-point constant target-velocity file
    #[command(name = "const-vel")]
    ConstVel(commands::ConstVelArgs),
    /// Shift a velocity column to a target sample mean
    #[command(name = "adjust-vel")]
    AdjustVel(commands::AdjustVelArgs),
    /// Add calendar columns to a history or weather file
    Timestamp(commands::TimestampArgs),
    /// Summarise a simulator history file
    History(commands::HistoryArgs),
    /// Read or edit a keyed control file
    Control {
        #[command(subcommand)]
        action: commands::ControlAction,
    },
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Zone(args) => commands::run_zone_command(args),
        CliCommand::Shape(args) => commands::run_shape_command(args),
        CliCommand::ConstVel(args) => commands::run_const_vel_command(args),
        CliCommand::AdjustVel(args) => commands::run_adjust_vel_command(args),
        CliCommand::Timestamp(args) => commands::run_timestamp_command(args),
        CliCommand::History(args) => commands::run_history_command(args),
        CliCommand::Control { action } => commands::run_control_command(action),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Core(#[from] S5Error),
    #[error(transparent)]
    Config(#[from] ShaperConfigError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn category(&self) -> S5ErrorCategory {
        match self {
            Self::Usage(_) => S5ErrorCategory::FormatError,
            Self::Core(error) => error.category(),
            Self::Config(ShaperConfigError::Read { .. }) => S5ErrorCategory::IoSystemError,
            Self::Config(_) => S5ErrorCategory::FormatError,
            Self::Internal(_) => S5ErrorCategory::StateError,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        match self {
            Self::Core(error) => error.diagnostic_line(),
            Self::Internal(error) => {
                format!("ERROR: [{}] {error:#}", self.category().as_str())
            }
            other => format!("ERROR: [{}] {}", other.category().as_str(), other),
        }
    }
}

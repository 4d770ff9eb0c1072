use super::CliError;
use super::helpers::{report_diagnostics, shaper_config};
use anyhow::Context;
use s5_core::control::{KeyedTextConfig, PathStyle};
use s5_core::field::{
    DATETIME_COLUMN, DEFAULT_ROUTE_LENGTH_KM, DEFAULT_START_DAY, DISTANCE_COLUMN, FieldDocument,
    HISTORY_STAMP_COLUMN, HistorySummary, TARGET_VELOCITY_COLUMN, VelocityProfile,
    WEATHER_DAY_COLUMN, WEATHER_TIME_COLUMN, add_history_timestamp, add_weather_day_time,
    add_weather_timestamp, adjust_velocity_mean, check_rectangular, constant_velocity_document,
    parse_start_day,
};
use s5_core::profile::{ClipPolicy, ProfileShaper};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(clap::Args)]
pub(super) struct ZoneArgs {
    /// Field document to inspect
    file: PathBuf,

    /// Also check that the document is a full distance x time weather grid
    #[arg(long)]
    weather: bool,
}

#[derive(clap::Args)]
pub(super) struct ShapeArgs {
    /// Velocity template whose profile drives the shape
    #[arg(long)]
    template: PathBuf,

    /// Output field document
    #[arg(long)]
    output: PathBuf,

    /// Target distance-weighted mean
    #[arg(long, allow_negative_numbers = true)]
    mean: f64,

    /// Variation magnitude at the 68th percentile; 0 gives a flat profile
    #[arg(long, default_value_t = 0.0)]
    spread: f64,

    /// Clip range applied before the mean is corrected
    #[arg(long, default_value = "none")]
    clip: ClipPolicy,

    /// Independent-variable column
    #[arg(long, default_value = DISTANCE_COLUMN)]
    distance_column: String,

    /// Column that is read as the driver and replaced by the result
    #[arg(long, default_value = TARGET_VELOCITY_COLUMN)]
    value_column: String,

    /// Shaper convergence config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ConstVelArgs {
    /// Target velocity in km/h
    velocity: f64,

    /// Output field document
    #[arg(long, default_value = "TargetVel.dat")]
    output: PathBuf,

    /// Route length in km
    #[arg(long, default_value_t = DEFAULT_ROUTE_LENGTH_KM)]
    distance: f64,
}

#[derive(clap::Args)]
pub(super) struct HistoryArgs {
    /// Simulator history file
    file: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct AdjustVelArgs {
    /// Velocity field document
    file: PathBuf,

    /// Target sample mean of the value column
    #[arg(long, allow_negative_numbers = true)]
    mean: f64,

    /// Column that is shifted
    #[arg(long, default_value = TARGET_VELOCITY_COLUMN)]
    value_column: String,

    /// Write to this path instead of editing in place
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum StampKind {
    /// Decode the packed DDHHMMSS column of a simulator history
    History,
    /// Combine the Day and Time (HHMM) columns of a weather file
    Weather,
    /// Rebuild Day and Time (HHMM) from an existing DateTime column
    DayTime,
}

#[derive(clap::Args)]
pub(super) struct TimestampArgs {
    /// Field document to stamp
    file: PathBuf,

    /// Which columns are read and written
    #[arg(long, value_enum, default_value = "history")]
    kind: StampKind,

    /// Calendar date of day 1 (YYYYMMDD or YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START_DAY)]
    start_day: String,

    /// Write to this path instead of editing in place
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
pub(super) enum ControlAction {
    /// Print the value stored for a key
    Get { file: PathBuf, key: String },
    /// Replace the value stored for a key
    Set {
        file: PathBuf,
        key: String,
        value: String,
        /// Write to this path instead of editing in place
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Rewrite path separators for win|dos|windows or unix|linux|lin
    Reformat {
        file: PathBuf,
        style: PathStyle,
        /// Write to this path instead of editing in place
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub(super) fn run_zone_command(args: ZoneArgs) -> Result<i32, CliError> {
    let document = FieldDocument::read(&args.file)?;
    let check = document.check_zone_consistency();

    println!("{}", document.zone);
    println!("Rows: {}", check.actual_rows);
    println!("Zone cells: {}", check.expected_rows);
    println!(
        "Zone status: {}",
        if check.is_consistent() { "consistent" } else { "mismatch" }
    );

    let mut diagnostics: Vec<_> = check.diagnostic.into_iter().collect();
    if args.weather {
        diagnostics.extend(check_rectangular(&document)?);
    }
    report_diagnostics(&diagnostics);

    if diagnostics.is_empty() { Ok(0) } else { Ok(1) }
}

pub(super) fn run_shape_command(args: ShapeArgs) -> Result<i32, CliError> {
    let config = shaper_config(args.config.as_deref())?;
    let mut document = FieldDocument::read(&args.template)?;
    let template =
        VelocityProfile::from_document(&document, &args.distance_column, &args.value_column)?;

    let shaped = ProfileShaper::new(config).rescale_to_target(
        &template.value,
        args.spread,
        args.mean,
        &template.distance,
        args.clip,
    )?;
    report_diagnostics(&shaped.diagnostics);
    debug!(
        iterations = shaped.iterations,
        deviation = shaped.final_deviation,
        "shaped template"
    );

    let samples = template.len();
    VelocityProfile::new(template.distance, shaped.values)?.store_in(
        &mut document,
        &args.distance_column,
        &args.value_column,
    )?;
    let include_datum = document.pressure.is_some();
    report_diagnostics(&document.write(&args.output, include_datum)?);

    println!(
        "Shaped {} samples to mean {} ({} correction passes, deviation {:.3e}).",
        samples,
        args.mean,
        shaped.iterations,
        shaped.final_deviation
    );
    println!("Wrote {}", args.output.display());
    Ok(0)
}

pub(super) fn run_const_vel_command(args: ConstVelArgs) -> Result<i32, CliError> {
    let document = constant_velocity_document(args.velocity, args.distance)?;
    report_diagnostics(&document.write(&args.output, false)?);
    println!("Wrote {}", args.output.display());
    Ok(0)
}

pub(super) fn run_adjust_vel_command(args: AdjustVelArgs) -> Result<i32, CliError> {
    let mut document = FieldDocument::read(&args.file)?;
    let shift = adjust_velocity_mean(&mut document, &args.value_column, args.mean)?;

    let output = args.output.as_ref().unwrap_or(&args.file);
    let include_datum = document.pressure.is_some();
    report_diagnostics(&document.write(output, include_datum)?);
    info!(column = %args.value_column, shift, "adjusted velocity mean");

    println!("Shifted '{}' by {shift} to mean {}.", args.value_column, args.mean);
    println!("Wrote {}", output.display());
    Ok(0)
}

pub(super) fn run_timestamp_command(args: TimestampArgs) -> Result<i32, CliError> {
    let mut document = FieldDocument::read(&args.file)?;
    match args.kind {
        StampKind::History => {
            let start_day = parse_start_day(&args.start_day)?;
            add_history_timestamp(&mut document, start_day, HISTORY_STAMP_COLUMN)?;
        }
        StampKind::Weather => {
            let start_day = parse_start_day(&args.start_day)?;
            add_weather_timestamp(
                &mut document,
                start_day,
                WEATHER_DAY_COLUMN,
                WEATHER_TIME_COLUMN,
            )?;
        }
        StampKind::DayTime => add_weather_day_time(
            &mut document,
            DATETIME_COLUMN,
            WEATHER_DAY_COLUMN,
            WEATHER_TIME_COLUMN,
        )?,
    }

    let output = args.output.as_ref().unwrap_or(&args.file);
    let include_datum = document.pressure.is_some();
    report_diagnostics(&document.write(output, include_datum)?);
    info!(rows = document.data.row_count(), "stamped field document");
    println!("Wrote {}", output.display());
    Ok(0)
}

pub(super) fn run_history_command(args: HistoryArgs) -> Result<i32, CliError> {
    let document = FieldDocument::read(&args.file)?;
    let summary = HistorySummary::from_document(&document)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&summary)
            .context("failed to serialise history summary")?;
        println!("{rendered}");
        return Ok(0);
    }

    println!("Driving time: {:.0} s", summary.driving_time_s);
    println!("Distance: {:.3} km", summary.distance_km);
    println!("Final charge: {:.2} %", summary.final_charge_pct);
    println!("Average velocity: {:.3} km/h", summary.average_velocity_kph);
    match summary.driving_velocity_std_kph {
        Some(std) => println!("Driving velocity std: {std:.3} km/h"),
        None => println!("Driving velocity std: n/a"),
    }
    println!(
        "Charge range: {:.2} .. {:.2} %",
        summary.min_charge_pct, summary.max_charge_pct
    );
    Ok(0)
}

pub(super) fn run_control_command(action: ControlAction) -> Result<i32, CliError> {
    match action {
        ControlAction::Get { file, key } => {
            let config = KeyedTextConfig::read(&file)?;
            println!("{}", config.get_value(&key)?);
        }
        ControlAction::Set {
            file,
            key,
            value,
            output,
        } => {
            let mut config = KeyedTextConfig::read(&file)?;
            config.set_value(&key, &value)?;
            debug!(%key, %value, "control value set");
            config.write(output.as_ref().unwrap_or(&file))?;
        }
        ControlAction::Reformat {
            file,
            style,
            output,
        } => {
            let mut config = KeyedTextConfig::read(&file)?;
            config.reformat(style);
            config.write(output.as_ref().unwrap_or(&file))?;
        }
    }
    Ok(0)
}

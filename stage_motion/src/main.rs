//! # Stage Cycler
//!
//! Drives selected axes through a position sequence until done, stopped
//! with Ctrl+C, or faulted.
//!
//! # Usage
//!
//! ```bash
//! # Three positions on axes 1 and 2, 0.2 s between moves
//! stage_cycler --fleet config/fleet.toml -a 1 -a 2 -p 10 -p 20 -p 30 --delay 0.2
//!
//! # Request from a file, every ordered pair of positions, with datalogging
//! stage_cycler --fleet config/fleet.toml --cycle config/cycle.toml --permute --datalog
//!
//! # Loop until Ctrl+C, bound as a synchronization group, JSON logs
//! stage_cycler --fleet config/fleet.toml --cycle config/cycle.toml --repeat --group --json
//! ```

use clap::Parser;
use serde::{Deserialize, Serialize};
use stage_common::config::{ConfigLoader, LogLevel};
use stage_common::hal::axis::Axis;
use stage_common::hal::types::AxisId;
use stage_hal::{AxisFleet, DriverRegistry, FleetConfig};
use stage_motion::cycle::{
    CycleEngine, CycleOptions, CycleProgress, CycleRequest, RunOutcome, parse_position,
};
use stage_motion::group::GroupPool;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How long `--group` waits for a free synchronization group.
const GROUP_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(1);

/// Stage Cycler - cycle axes through a position sequence
#[derive(Parser, Debug)]
#[command(name = "stage_cycler")]
#[command(version)]
#[command(about = "Cycle motorized stage axes through a sequence of positions")]
#[command(long_about = None)]
struct Args {
    /// Fleet configuration (driver, log directory, axes)
    #[arg(short, long, default_value = "config/fleet.toml")]
    fleet: PathBuf,

    /// Cycle request file (axes, positions, [options])
    #[arg(short, long, value_name = "FILE")]
    cycle: Option<PathBuf>,

    /// Axis to cycle, in move order (can be specified multiple times)
    #[arg(short, long = "axis", action = clap::ArgAction::Append)]
    axes: Vec<u8>,

    /// Target position (can be specified multiple times)
    #[arg(short, long = "position", allow_hyphen_values = true, action = clap::ArgAction::Append)]
    positions: Vec<String>,

    /// Visit every ordered pair of distinct positions
    #[arg(long)]
    permute: bool,

    /// Seconds to wait after each non-blocking move
    #[arg(short, long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Log each axis's position to {log_dir}/axis{ID}_positions.log
    #[arg(long)]
    datalog: bool,

    /// Replay the sequence until stopped
    #[arg(long)]
    repeat: bool,

    /// Bind the selected axes as a synchronization group for the run
    #[arg(long)]
    group: bool,

    /// Write a JSON run summary to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

/// `cycle.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CycleFile {
    #[serde(default)]
    axes: Vec<AxisId>,
    #[serde(default)]
    positions: Vec<f64>,
    #[serde(default)]
    options: CycleOptions,
}

/// JSON report written by `--report`.
#[derive(Debug, Serialize)]
struct RunSummary {
    service: String,
    axes: Vec<AxisId>,
    positions: Vec<f64>,
    options: CycleOptions,
    group: Option<u8>,
    outcome: &'static str,
    visits: usize,
    fault: Option<String>,
    progress: Option<CycleProgress>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let fleet_config = AxisFleet::load_config(&args.fleet);
    let level = fleet_config
        .as_ref()
        .map(|config| config.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Stage Cycler v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = match fleet_config {
        Ok(config) => run(&args, config),
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(outcome) if outcome.is_failure() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Cycler failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: FleetConfig) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let service = config.shared.service_name.clone();
    let fleet = AxisFleet::build(config, &DriverRegistry::with_builtin_drivers())?;
    let request = build_request(args, &fleet)?;

    let pool = GroupPool::new(fleet.channel());
    let mut lease = pool.lease();
    let group = if args.group {
        let group = lease.acquire(request.axes(), GROUP_ACQUIRE_TIMEOUT)?;
        group.enable()?;
        Some(group.number().get())
    } else {
        None
    };

    let engine = Arc::new(CycleEngine::new(fleet.log_dir()));
    {
        let engine = engine.clone();
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            engine.stop();
        })?;
    }

    engine.start(request.clone())?;
    let outcome = engine
        .wait()
        .unwrap_or_else(|| RunOutcome::Aborted("no run was started".into()));
    drop(lease);

    if let Some(path) = &args.report {
        let summary = summarize(service, &request, group, &outcome, engine.progress());
        write_report(path, &summary)?;
    }

    for axis in request.axes() {
        let faults = axis.faults();
        if !faults.is_empty() {
            warn!("Axis {} faults: {}", axis.id(), faults.descriptions().join(", "));
        }
    }

    info!("Stage Cycler finished: {:?}", outcome);
    Ok(outcome)
}

/// Merge `--cycle` with command-line overrides and resolve the axes.
fn build_request(args: &Args, fleet: &AxisFleet) -> Result<CycleRequest, Box<dyn std::error::Error>> {
    let file = match &args.cycle {
        Some(path) => CycleFile::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => CycleFile::default(),
    };

    let ids = if args.axes.is_empty() {
        file.axes
    } else {
        args.axes.iter().copied().map(AxisId).collect()
    };
    let positions = if args.positions.is_empty() {
        file.positions
    } else {
        args.positions
            .iter()
            .map(|text| parse_position(text))
            .collect::<Result<Vec<_>, _>>()?
    };

    let options = CycleOptions {
        permute: file.options.permute || args.permute,
        delay_s: args.delay.unwrap_or(file.options.delay_s),
        datalog: file.options.datalog || args.datalog,
        repeat: file.options.repeat || args.repeat,
    };

    let axes = fleet.resolve(&ids)?;
    Ok(CycleRequest::new(axes, positions, options)?)
}

fn summarize(
    service: String,
    request: &CycleRequest,
    group: Option<u8>,
    outcome: &RunOutcome,
    progress: Option<CycleProgress>,
) -> RunSummary {
    let (label, fault) = match outcome {
        RunOutcome::Completed { .. } => ("completed", None),
        RunOutcome::Cancelled { .. } => ("cancelled", None),
        RunOutcome::Faulted { error, .. } => ("faulted", Some(error.to_string())),
        RunOutcome::Aborted(reason) => ("aborted", Some(reason.clone())),
    };

    RunSummary {
        service,
        axes: request.axis_ids(),
        positions: request.positions().to_vec(),
        options: *request.options(),
        group,
        outcome: label,
        visits: outcome.visits(),
        fault,
        progress,
    }
}

fn write_report(path: &Path, summary: &RunSummary) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    info!("Run summary written to {:?}", path);
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the fleet's log level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

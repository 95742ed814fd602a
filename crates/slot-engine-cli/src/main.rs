//! `slots` CLI — query interview-slot availability from a bookings file.
//!
//! ## Usage
//!
//! ```sh
//! # Is 10:15 free for a 30-minute interview with alice?
//! slots check -i bookings.json --coordinator alice --at 2026-03-02T10:15 --duration 30
//!
//! # Rescheduling the 09:00 interview: its own start stays available
//! slots check -i bookings.json --editing 2026-03-02T09:00 --at 2026-03-02T09:00 --duration 60
//!
//! # Does the day have any free 45-minute slot?
//! cat bookings.json | slots day --date 2026-03-02 --duration 45
//!
//! # Every free start on the half hour, as JSON
//! slots list -i bookings.json --date 2026-03-02 --duration 60 --granularity 30 --json
//!
//! # Which hours a picker should disable
//! slots hours -i bookings.json --date 2026-03-02 --duration 30
//! ```

mod logging;
mod settings;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use slot_engine::booking::{self, parse_booking_payload};
use slot_engine::gate::check_slot;
use slot_engine::scan::blocked_hours;
use slot_engine::{
    build_index, has_any_available_slot, list_available_slots, DayIndex, ScanStrategy,
};
use tracing::{debug, info};

/// Process exit code when the requested slot is not available.
const EXIT_UNAVAILABLE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Interview slot availability from a coordinator's bookings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
struct BookingInput {
    /// Bookings JSON array (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Ignore bookings tagged with any other coordinator
    #[arg(long)]
    coordinator: Option<String>,
    /// Original start of the booking being rescheduled
    #[arg(long, value_parser = parse_time)]
    editing: Option<NaiveDateTime>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    MinuteScan,
    GapWalk,
}

impl From<StrategyArg> for ScanStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::MinuteScan => ScanStrategy::MinuteScan,
            StrategyArg::GapWalk => ScanStrategy::GapWalk,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single start time
    Check {
        #[command(flatten)]
        bookings: BookingInput,
        /// Requested start (e.g. 2026-03-02T10:15)
        #[arg(long, value_parser = parse_time)]
        at: NaiveDateTime,
        /// Interview length in minutes
        #[arg(short, long)]
        duration: i64,
    },
    /// Report whether a day has any free slot
    Day {
        #[command(flatten)]
        bookings: BookingInput,
        /// Day to scan (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(short, long)]
        duration: i64,
    },
    /// List every free slot of a day
    List {
        #[command(flatten)]
        bookings: BookingInput,
        #[arg(long)]
        date: NaiveDate,
        #[arg(short, long)]
        duration: i64,
        /// Minutes between candidate starts (overrides configuration)
        #[arg(long)]
        granularity: Option<i64>,
        /// Search strategy (overrides configuration)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Print JSON instead of one slot per line
        #[arg(long)]
        json: bool,
    },
    /// Show which hours of a day are fully blocked
    Hours {
        #[command(flatten)]
        bookings: BookingInput,
        #[arg(long)]
        date: NaiveDate,
        #[arg(short, long)]
        duration: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = settings::load_scan_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            bookings,
            at,
            duration,
        } => {
            let index = load_index(&bookings)?;
            match check_slot(at, duration, &index, bookings.editing) {
                Ok(()) => println!("available"),
                Err(e) => {
                    println!("unavailable: {}", e.message());
                    process::exit(EXIT_UNAVAILABLE);
                }
            }
        }
        Commands::Day {
            bookings,
            date,
            duration,
        } => {
            config.validate()?;
            let index = load_index(&bookings)?;
            if has_any_available_slot(date, duration, &index, bookings.editing, &config) {
                println!("{}: open", date);
            } else {
                println!("{}: fully booked", date);
            }
        }
        Commands::List {
            bookings,
            date,
            duration,
            granularity,
            strategy,
            json,
        } => {
            if let Some(minutes) = granularity {
                config = config.with_granularity(minutes);
            }
            if let Some(strategy) = strategy {
                config = config.with_strategy(strategy.into());
            }
            config.validate()?;

            let index = load_index(&bookings)?;
            let slots = list_available_slots(date, duration, &index, bookings.editing, &config);
            info!(count = slots.len(), %date, "listed free slots");

            if json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else {
                for slot in &slots {
                    println!("{}-{}", slot.start.format("%H:%M"), slot.end.format("%H:%M"));
                }
            }
        }
        Commands::Hours {
            bookings,
            date,
            duration,
        } => {
            config.validate()?;
            let index = load_index(&bookings)?;
            let blocked = blocked_hours(date, duration, &index, bookings.editing, &config);
            for hour in 0..24u32 {
                let status = if blocked.contains(&hour) { "blocked" } else { "open" };
                println!("{:02}:00 {}", hour, status);
            }
        }
    }

    Ok(())
}

fn parse_time(raw: &str) -> Result<NaiveDateTime, String> {
    slot_engine::parse_timestamp(raw).map_err(|e| e.to_string())
}

/// Read, scope, and index the bookings named by `input`.
fn load_index(input: &BookingInput) -> Result<DayIndex> {
    let json = read_input(input.input.as_deref())?;
    let mut records = parse_booking_payload(&json).context("Failed to parse bookings JSON")?;

    if let Some(coordinator) = input.coordinator.as_deref() {
        records = booking::scope_to_coordinator(records, coordinator);
        debug!(coordinator, kept = records.len(), "scoped bookings to coordinator");
    }

    Ok(build_index(&records))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

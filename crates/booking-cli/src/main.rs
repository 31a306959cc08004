//! `booking` CLI: resolve slots and commit bookings against a JSON scenario.
//!
//! A scenario file holds an optional engine `config` plus the `templates`,
//! `eventTypes` and `bookings` of an in-memory store.
//!
//! ## Usage
//!
//! ```sh
//! # Free slots for an event over a date range
//! booking slots -i scenario.json --event <uuid> --from 2026-03-16 --to 2026-03-20
//!
//! # Book a slot and save the updated scenario
//! booking book -i scenario.json --event <uuid> --name Ana --email ana@example.com \
//!     --start 2026-03-16T09:00:00Z -o scenario.json
//!
//! # Cancel a booking
//! booking cancel -i scenario.json --booking <uuid> -o scenario.json
//!
//! # A host's upcoming (or past) meetings
//! booking meetings -i scenario.json --owner ana [--past] [--limit 3]
//!
//! # Pin "now" for reproducible output
//! booking slots -i scenario.json --event <uuid> --from 2026-03-16 --to 2026-03-16 \
//!     --now 2026-03-13T12:00:00Z
//! ```

use std::io::{self, Read};

use anyhow::{Context, Result};
use booking_engine::store::EventTypeStore;
use booking_engine::{
    BookingEngine, BookingRequest, EngineConfig, FixedClock, InMemoryStore, MeetingFilter, Snapshot,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "booking", version, about = "Slot resolution and booking commits")]
struct Cli {
    /// Scenario JSON file (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Fixed "now" as RFC 3339 (defaults to the system clock)
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List free slots of an event type, per date
    Slots {
        #[arg(long)]
        event: Uuid,
        /// First date (inclusive)
        #[arg(long)]
        from: NaiveDate,
        /// Last date (inclusive)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Commit a booking
    Book {
        #[arg(long)]
        event: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        start: DateTime<Utc>,
        /// End time (defaults to start + event duration)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        /// Free-text note for the host
        #[arg(long)]
        info: Option<String>,
        /// Write the updated scenario here
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Cancel a booking (cancelling twice is fine)
    Cancel {
        #[arg(long)]
        booking: Uuid,
        /// Write the updated scenario here
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List a host's meetings
    Meetings {
        #[arg(long)]
        owner: String,
        /// Past meetings instead of upcoming ones
        #[arg(long)]
        past: bool,
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List a host's event types
    Events {
        #[arg(long)]
        owner: String,
        /// Include private event types
        #[arg(long)]
        all: bool,
    },
}

/// On-disk scenario: engine config plus store contents.
///
/// Without a `config` section the engine reads `BOOKING_*` environment variables.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<EngineConfig>,
    #[serde(flatten)]
    snapshot: Snapshot,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let raw = read_input(cli.input.as_deref())?;
    let scenario: Scenario = serde_json::from_str(&raw).context("Failed to parse scenario JSON")?;
    validate_scenario(&scenario)?;
    let config = match scenario.config {
        Some(config) => config,
        None => EngineConfig::from_env().context("Invalid BOOKING_* environment")?,
    };
    let clock = FixedClock(cli.now.unwrap_or_else(Utc::now));
    let engine = BookingEngine::with_clock(
        InMemoryStore::from_snapshot(scenario.snapshot),
        clock,
        config,
    )
    .context("Invalid engine config")?;

    match cli.command {
        Commands::Slots { event, from, to } => {
            let owner = engine
                .store()
                .get_event_type(event)?
                .map(|e| e.owner_id)
                .with_context(|| format!("Unknown event type: {event}"))?;
            let slots = engine.resolve_available_slots(&owner, event, from, to)?;
            print_json(&slots)?;
        }
        Commands::Book {
            event,
            name,
            email,
            start,
            end,
            info,
            output,
        } => {
            let end = match end {
                Some(end) => end,
                None => {
                    let event_type = engine
                        .store()
                        .get_event_type(event)?
                        .with_context(|| format!("Unknown event type: {event}"))?;
                    start + Duration::minutes(event_type.duration_minutes as i64)
                }
            };
            let booking = engine.commit_booking(BookingRequest {
                event_type_id: event,
                guest_name: name,
                guest_email: email,
                start_time: start,
                end_time: end,
                additional_info: info,
            })?;
            print_json(&booking)?;
            save_scenario(&engine, output.as_deref())?;
        }
        Commands::Cancel { booking, output } => {
            let cancelled = engine.cancel_booking(booking)?;
            print_json(&cancelled)?;
            save_scenario(&engine, output.as_deref())?;
        }
        Commands::Meetings { owner, past, limit } => {
            let meetings = match (past, limit) {
                (false, Some(limit)) => engine.upcoming_meetings(&owner, limit)?,
                (false, None) => engine.list_meetings(&owner, MeetingFilter::Upcoming)?,
                (true, limit) => {
                    let mut meetings = engine.list_meetings(&owner, MeetingFilter::Past)?;
                    meetings.truncate(limit.unwrap_or(usize::MAX));
                    meetings
                }
            };
            print_json(&meetings)?;
        }
        Commands::Events { owner, all } => {
            print_json(&engine.list_event_types(&owner, all)?)?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn validate_scenario(scenario: &Scenario) -> Result<()> {
    for template in &scenario.snapshot.templates {
        template
            .validate()
            .with_context(|| format!("Invalid template for host {}", template.owner_id))?;
    }
    for event in &scenario.snapshot.event_types {
        event
            .validate()
            .with_context(|| format!("Invalid event type {}", event.id))?;
    }
    Ok(())
}

fn save_scenario(
    engine: &BookingEngine<InMemoryStore, FixedClock>,
    path: Option<&str>,
) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let scenario = Scenario {
        config: Some(engine.config().clone()),
        snapshot: engine.store().snapshot()?,
    };
    let json = serde_json::to_string_pretty(&scenario)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
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

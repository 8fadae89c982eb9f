//! Command-line host for LazyCal core.
//!
//! # Responsibility
//! - Drive the same session/intent contract the UI widget uses.
//! - Keep output deterministic for quick local checks.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use lazycal_core::{
    init_logging_from_config, CalendarSession, CoreConfig, EventId, EventRecord, EventTime,
    IntentOutcome, TitleRequest, TitleResponse, WidgetIntent,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lazycal")]
#[command(about = "Manage your local LazyCal events")]
struct Cli {
    /// SQLite database file (defaults to LAZYCAL_DB_PATH or the temp dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,
    /// List stored events in insertion order
    List,
    /// Create an event as if its date cell was clicked
    Add {
        /// Event title (prompted for when omitted; empty input cancels)
        title: Option<String>,

        /// Date or date-time (e.g. "2024-06-01" or "2024-06-01T15:00")
        #[arg(short, long)]
        start: String,

        /// Mark as all-day (implied when --start is a plain date)
        #[arg(long)]
        all_day: bool,
    },
    /// Move or resize an event (replaces its time span)
    Move {
        id: String,

        #[arg(short, long)]
        start: String,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(long)]
        all_day: bool,
    },
    /// Remove an event by id
    Remove { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_logging_from_config(&config)?;

    if let Commands::Ping = cli.command {
        println!("lazycal_core ping={}", lazycal_core::ping());
        println!("lazycal_core version={}", lazycal_core::core_version());
        return Ok(());
    }

    let mut session = CalendarSession::open_sqlite(&config.db_path, &config.slot_key)
        .with_context(|| format!("opening {}", config.db_path.display()))?;

    match cli.command {
        Commands::Ping => Ok(()),
        Commands::List => cmd_list(&session),
        Commands::Add {
            title,
            start,
            all_day,
        } => cmd_add(&mut session, title, &start, all_day),
        Commands::Move {
            id,
            start,
            end,
            all_day,
        } => cmd_move(&mut session, &id, &start, end.as_deref(), all_day),
        Commands::Remove { id } => cmd_remove(&mut session, &id),
    }
}

fn cmd_list(session: &CalendarSession) -> Result<()> {
    if session.snapshot().is_empty() {
        println!("No events.");
        return Ok(());
    }

    for record in session.snapshot() {
        println!("{}", format_record(record));
    }
    Ok(())
}

fn cmd_add(
    session: &mut CalendarSession,
    title: Option<String>,
    start: &str,
    all_day: bool,
) -> Result<()> {
    let date = parse_time(start)?;
    let all_day = all_day || date.is_date_only();

    let request = match session.handle_intent(WidgetIntent::DateClick { date, all_day })? {
        IntentOutcome::TitleRequested(request) => request,
        other => bail!("unexpected outcome for date click: {other:?}"),
    };

    let title = match title {
        Some(title) => Some(title),
        None => prompt_title(&request)?,
    };

    match session.fulfill_title(TitleResponse {
        request_id: request.request_id,
        title,
    })? {
        IntentOutcome::Added(id) => println!("Created {id}"),
        IntentOutcome::Cancelled(_) => println!("Cancelled; no event created."),
        other => bail!("unexpected outcome for title: {other:?}"),
    }
    Ok(())
}

fn cmd_move(
    session: &mut CalendarSession,
    id: &str,
    start: &str,
    end: Option<&str>,
    all_day: bool,
) -> Result<()> {
    let id = EventId::new(id)?;
    let existing = session
        .store()
        .get(&id)
        .ok_or_else(|| anyhow!("no event with id {id}"))?;

    let start = parse_time(start)?;
    let record = EventRecord {
        id: id.clone(),
        title: existing.title.clone(),
        start,
        end: end.map(parse_time).transpose()?,
        all_day: all_day || start.is_date_only(),
    };

    session.handle_intent(WidgetIntent::EventChanged(record))?;
    println!("Moved {id}");
    Ok(())
}

fn cmd_remove(session: &mut CalendarSession, id: &str) -> Result<()> {
    let id = EventId::new(id)?;
    match session.handle_intent(WidgetIntent::EventRemoved(id.clone()))? {
        IntentOutcome::Removed { matched: true, .. } => println!("Removed {id}"),
        _ => println!("No event with id {id}"),
    }
    Ok(())
}

fn prompt_title(request: &TitleRequest) -> Result<Option<String>> {
    let title: String = Input::new()
        .with_prompt(format!("Title for {}", request.date))
        .allow_empty(true)
        .interact_text()?;
    Ok(Some(title))
}

fn parse_time(value: &str) -> Result<EventTime> {
    Ok(value.parse::<EventTime>()?)
}

fn format_record(record: &EventRecord) -> String {
    let span = match &record.end {
        Some(end) => format!("{} -> {}", record.start, end),
        None => record.start.to_string(),
    };
    let kind = if record.all_day { "all-day" } else { "timed" };
    format!("{}  {}  [{}]  {}", record.id, span, kind, record.title)
}

//! Kioku CLI
//!
//! Command-line driver for the scheduling engine. Items are read from and
//! written to JSON record files (`-` for stdin/stdout).

mod config;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use kioku_core::{
    format_timestamp, parse_timestamp, Item, ItemFactory, Rating, Scheduler, SchedulerPolicy,
    SystemClock,
};

/// Kioku - spaced repetition scheduler CLI
#[derive(Parser)]
#[command(name = "kioku")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create, review and preview spaced repetition items stored as JSON")]
struct Cli {
    /// Policy file (overrides KIOKU_POLICY and the config directory)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new item, due immediately
    New {
        /// Front of the card
        word: String,
        /// Back of the card
        meaning: String,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// Creation instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Write the item here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a rating to an item
    Review {
        /// Item record (`-` for stdin)
        file: PathBuf,
        /// again|hard|good|easy or 1-4 (other numbers fall back to a safe default)
        rating: String,
        /// Review instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Replace the record in place instead of printing the outcome
        #[arg(long)]
        write: bool,
    },

    /// Show the interval each rating would schedule
    Preview {
        /// Item record (`-` for stdin)
        file: PathBuf,
        /// Review instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Show an item's scheduling state
    Show {
        /// Item record (`-` for stdin)
        file: PathBuf,
        /// Instant to evaluate at (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the active scheduling policy
    Policy {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let (policy, source) = config::resolve_policy(cli.policy)?;

    match cli.command {
        Commands::New {
            word,
            meaning,
            notes,
            at,
            output,
        } => run_new(policy, &word, &meaning, notes.as_deref(), at, output),
        Commands::Review {
            file,
            rating,
            at,
            write,
        } => run_review(policy, &file, &rating, at, write),
        Commands::Preview { file, at } => run_preview(policy, &file, at),
        Commands::Show { file, at, json } => run_show(&file, at, json),
        Commands::Policy { json } => run_policy(&policy, &source, json),
    }
}

/// Run new command
fn run_new(
    policy: SchedulerPolicy,
    word: &str,
    meaning: &str,
    notes: Option<&str>,
    at: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let factory = ItemFactory::with_policy(SystemClock, policy)?;
    let item = factory.create_new(word, meaning, parse_instant(at.as_deref())?, notes);
    match output {
        Some(path) => write_item(&path, &item),
        None => {
            println!("{}", serde_json::to_string_pretty(&item)?);
            Ok(())
        }
    }
}

/// Run review command
fn run_review(
    policy: SchedulerPolicy,
    file: &Path,
    rating: &str,
    at: Option<String>,
    write: bool,
) -> anyhow::Result<()> {
    let scheduler = Scheduler::with_policy(SystemClock, policy)?;
    let item = read_item(file)?;
    let outcome = scheduler.review(&item, parse_rating(rating)?, parse_instant(at.as_deref())?);

    if write && file != Path::new("-") {
        write_item(file, &outcome.item)?;
        eprintln!(
            "{} {} -> {} ({})",
            "Reviewed".green().bold(),
            outcome.item.word,
            outcome.item.phase,
            format_days(outcome.scheduled_days)
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}

/// Run preview command
fn run_preview(policy: SchedulerPolicy, file: &Path, at: Option<String>) -> anyhow::Result<()> {
    let scheduler = Scheduler::with_policy(SystemClock, policy)?;
    let item = read_item(file)?;
    let preview = scheduler.preview_intervals(&item, parse_instant(at.as_deref())?);

    println!("{}", format!("=== {} ===", item.word).cyan().bold());
    for (rating, days) in preview.iter() {
        let label = format!("{:>5}", rating.as_str());
        let label = match rating {
            Rating::Again => label.red(),
            Rating::Hard => label.yellow(),
            Rating::Good => label.green(),
            Rating::Easy => label.blue(),
        };
        println!("{} {}", label.bold(), format_days(days));
    }
    Ok(())
}

/// Scheduling state as reported by `show --json`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowReport<'a> {
    id: &'a str,
    word: &'a str,
    phase: &'static str,
    due: bool,
    due_at: Option<String>,
    retrievability: f64,
    stability: f64,
    difficulty: f64,
    reps: u32,
    lapses: u32,
}

/// Run show command
fn run_show(file: &Path, at: Option<String>, json: bool) -> anyhow::Result<()> {
    let item = read_item(file)?;
    let at = parse_instant(at.as_deref())?.unwrap_or_else(Utc::now);
    let report = ShowReport {
        id: &item.id,
        word: &item.word,
        phase: item.phase.as_str(),
        due: item.is_due(at),
        due_at: item.due_at.map(format_timestamp),
        retrievability: item.retrievability_at(at),
        stability: item.stability,
        difficulty: item.difficulty,
        reps: item.reps,
        lapses: item.lapses,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", format!("=== {} ===", report.word).cyan().bold());
    println!("{}: {}", "Id".white().bold(), report.id);
    println!("{}: {}", "Phase".white().bold(), report.phase);
    let due_label = report.due_at.as_deref().unwrap_or("(invalid)");
    if report.due {
        println!("{}: {} {}", "Due".white().bold(), due_label, "(due now)".yellow());
    } else {
        println!("{}: {}", "Due".white().bold(), due_label);
    }
    println!(
        "{}: {:.1}%",
        "Retrievability".white().bold(),
        report.retrievability * 100.0
    );
    println!("{}: {:.2} days", "Stability".white().bold(), report.stability);
    println!("{}: {:.2}", "Difficulty".white().bold(), report.difficulty);
    println!("{}: {} ({} lapses)", "Reviews".white().bold(), report.reps, report.lapses);
    Ok(())
}

/// Run policy command
fn run_policy(
    policy: &SchedulerPolicy,
    source: &config::PolicySource,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(policy)?);
        return Ok(());
    }

    println!("{}", "=== Scheduling Policy ===".cyan().bold());
    println!("{}: {}", "Source".white().bold(), source);
    println!();
    let value = serde_json::to_value(policy)?;
    if let Some(fields) = value.as_object() {
        for (name, v) in fields {
            println!("{}: {}", name.white().bold(), v);
        }
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn parse_instant(raw: Option<&str>) -> anyhow::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_timestamp(s).with_context(|| format!("Invalid timestamp: {s}")))
        .transpose()
}

/// Rating names and digits map directly; any other number goes to the
/// scheduler, which falls back to a phase-safe rating.
fn parse_rating(raw: &str) -> anyhow::Result<f64> {
    if let Ok(rating) = raw.parse::<Rating>() {
        return Ok(f64::from(rating));
    }
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("Unknown rating: {raw} (expected again|hard|good|easy or 1-4)"))
}

fn read_item(path: &Path) -> anyhow::Result<Item> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    Item::from_json(&json).with_context(|| format!("Failed to parse item {}", path.display()))
}

fn write_item(path: &Path, item: &Item) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(item)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn format_days(days: f64) -> String {
    if days < 1.0 / 24.0 {
        format!("{:.0} min", days * 1440.0)
    } else if days < 1.0 {
        format!("{:.0} h", days * 24.0)
    } else {
        format!("{days:.0} d")
    }
}

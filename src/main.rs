//! `onthisday`: print national days, holidays, events, births and deaths for a date.
//!
//! Config is read from `$ONTHISDAY_CONFIG_PATH`, `config/onthisday.toml` or
//! `config/onthisday.json` (see `onthisday_digest::config`).

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use onthisday_digest::{render, request_label, AppConfig, Collector, Event};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Day of month (requires --month)
    #[arg(long, requires = "month")]
    day: Option<u32>,

    /// Month number 1-12 (requires --day)
    #[arg(long, requires = "day")]
    month: Option<u32>,

    /// Year; without it the next occurrence of day/month is used
    #[arg(long, requires = "day")]
    year: Option<i32>,

    /// Full date, e.g. 2024-08-02 (alternative to --day/--month/--year)
    #[arg(long, conflicts_with_all = ["day", "month", "year"])]
    date: Option<NaiveDate>,

    /// Config file (overrides $ONTHISDAY_CONFIG_PATH)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON array instead of text lines
    #[arg(long)]
    json: bool,
}

/// Logs go to stderr so stdout stays clean for the rendered list.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("onthisday_digest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(p) => AppConfig::load_from(p)?,
        None => AppConfig::load_default()?,
    };
    let collector = Collector::from_config(&cfg).context("building source registry")?;

    let today = Local::now().date_naive();
    let (label, events): (String, Vec<Event>) = match (cli.date, cli.day, cli.month) {
        (Some(date), _, _) => (
            date.to_string(),
            collector
                .collect(date.day(), date.month(), Some(date.year()), today)
                .await
                .events,
        ),
        (None, Some(day), Some(month)) => {
            (
                request_label(day, month, cli.year, today),
                collector.collect(day, month, cli.year, today).await.events,
            )
        }
        (None, None, None) => ("today".to_string(), collector.events_on(today).await),
        _ => bail!("--day and --month must be given together"),
    };

    if cli.json {
        let views: Vec<_> = events.iter().map(Event::view).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print!("{}", render(&label, &events));
    }
    Ok(())
}

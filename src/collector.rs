//! # Collector
//!
//! Runs every registered source for one calendar date, in registry order, and
//! returns the merged records sorted by [`Event::order_key`].
//!
//! A failing source (fetch or parse) is logged with its name and cause and
//! contributes nothing; the rest of the batch is still returned. Duplicate facts
//! across sources are kept.

use chrono::{Datelike, Local, NaiveDate};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{ConfigError, SourceError};
use crate::event::{sort_events, Event};
use crate::sources::{build_sources, HttpFetcher, PageFetcher, Source};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("collect_runs_total", "Collection runs started.");
        describe_counter!(
            "collect_events_total",
            "Records returned after merging all sources."
        );
        describe_counter!(
            "collect_source_errors_total",
            "Sources that failed during a run (fetch/parse)."
        );
        describe_counter!(
            "source_events_total",
            "Records produced by a single source."
        );
        describe_counter!(
            "source_skipped_entries_total",
            "Upstream entries dropped for missing link or year."
        );
        describe_counter!(
            "fetch_attempt_errors_total",
            "Failed HTTP attempts, including retried ones."
        );
        describe_histogram!("source_parse_ms", "Source payload parse time in milliseconds.");
        describe_gauge!(
            "collect_last_run_ts",
            "Unix ts when the last collection run finished."
        );
    });
}

/// A source that contributed nothing because it failed.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: SourceError,
}

/// Sorted records plus the sources that failed along the way.
#[derive(Debug, Default)]
pub struct CollectReport {
    pub events: Vec<Event>,
    pub failures: Vec<SourceFailure>,
}

impl CollectReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct Collector {
    sources: Vec<Box<dyn Source>>,
}

impl Collector {
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        Self { sources }
    }

    /// Registry from config, fetched over HTTP. Fails on any malformed entry.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&cfg.http)?);
        Self::with_fetcher(cfg, fetcher)
    }

    /// Same as [`Collector::from_config`] with an injected transport.
    pub fn with_fetcher(
        cfg: &AppConfig,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, ConfigError> {
        let sources = build_sources(&cfg.sources, &cfg.weights, fetcher)?;
        tracing::info!(sources = sources.len(), "collector ready");
        Ok(Self::new(sources))
    }

    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    /// Records for `day`/`month` (and optional `year`), sorted. Failing sources
    /// are skipped; see [`Collector::collect`] to inspect them.
    pub async fn events_for(&self, day: u32, month: u32, year: Option<i32>) -> Vec<Event> {
        self.collect(day, month, year, Local::now().date_naive())
            .await
            .events
    }

    /// Records for the current local date.
    pub async fn events_today(&self) -> Vec<Event> {
        self.events_on(Local::now().date_naive()).await
    }

    /// Records for the day/month of `today`, resolved relative to `today`.
    pub async fn events_on(&self, today: NaiveDate) -> Vec<Event> {
        self.collect(today.day(), today.month(), None, today)
            .await
            .events
    }

    /// Full run with an explicit reference date for year resolution.
    pub async fn collect(
        &self,
        day: u32,
        month: u32,
        year: Option<i32>,
        today: NaiveDate,
    ) -> CollectReport {
        ensure_metrics_described();
        counter!("collect_runs_total").increment(1);

        let mut report = CollectReport::default();
        for source in &self.sources {
            match source.fetch_events(day, month, year, today).await {
                Ok(mut v) => {
                    tracing::debug!(source = source.name(), count = v.len(), "source ok");
                    report.events.append(&mut v);
                }
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        kind = e.kind(),
                        error = %e,
                        "source failed, skipping"
                    );
                    counter!("collect_source_errors_total", "source" => source.name().to_string())
                        .increment(1);
                    report.failures.push(SourceFailure {
                        source: source.name().to_string(),
                        error: e,
                    });
                }
            }
        }

        sort_events(&mut report.events);

        counter!("collect_events_total").increment(report.events.len() as u64);
        gauge!("collect_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(
            day,
            month,
            year = ?year,
            events = report.events.len(),
            failed = report.failures.len(),
            "collection finished"
        );
        report
    }
}

/// Header label for a request: the resolved ISO date, so it matches the dates
/// sources were asked for. Unresolvable requests fall back to `MM-DD`.
pub fn request_label(day: u32, month: u32, year: Option<i32>, today: NaiveDate) -> String {
    match crate::dates::resolve_date(day, month, year, today) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => format!("{month:02}-{day:02}"),
    }
}

/// Count header followed by one line per record, in the given order.
pub fn render(label: &str, events: &[Event]) -> String {
    let mut out = format!("Found {} events for {label}:\n", events.len());
    for ev in events {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{ev}");
    }
    out
}

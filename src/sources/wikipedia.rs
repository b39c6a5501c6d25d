// src/sources/wikipedia.rs
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use metrics::{counter, histogram};
use serde::Deserialize;
use std::sync::Arc;

use crate::dates::resolve_date;
use crate::error::{ConfigError, SourceError};
use crate::event::{Event, EventType, SourceMeta};
use crate::sources::{PageFetcher, Source, UrlTemplate};
use crate::text::normalize_text;

#[derive(Debug, Deserialize)]
struct Feed {
    births: Vec<Entry>,
    deaths: Vec<Entry>,
    events: Vec<Entry>,
    holidays: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    year: Option<i32>,
    text: String,
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<PageUrl>,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    #[serde(default)]
    page: Option<String>,
}

impl Entry {
    /// Desktop URL of this entry's own first page.
    fn link(&self) -> Option<&str> {
        self.pages
            .first()?
            .content_urls
            .as_ref()?
            .desktop
            .as_ref()?
            .page
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Wikipedia REST "on this day" feed: births, deaths, events and holidays.
pub struct WikipediaSource {
    meta: Arc<SourceMeta>,
    fetcher: Arc<dyn PageFetcher>,
    template: UrlTemplate,
}

impl WikipediaSource {
    pub const NAME: &'static str = "wikipedia";
    pub const URL_TEMPLATE: &'static str =
        "https://en.wikipedia.org/api/rest_v1/feed/onthisday/all/{month}/{day}";

    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        template: &str,
        weight: i32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            meta: SourceMeta::new(Self::NAME, weight),
            fetcher,
            template: UrlTemplate::parse(Self::NAME, template, &["month", "day"])?,
        })
    }

    /// Feed JSON in, records out. `date` carries the requested day/month and
    /// the year used for holidays; births, deaths and events use their own year.
    ///
    /// Entries without a page link or a usable year are skipped and logged.
    pub fn parse_feed(&self, body: &str, date: NaiveDate) -> Result<Vec<Event>, SourceError> {
        let t0 = std::time::Instant::now();
        let feed: Feed = serde_json::from_str(body)
            .map_err(|e| SourceError::parse(Self::NAME, format!("feed json: {e}")))?;

        let (day, month) = (date.day(), date.month());
        let mut out = Vec::with_capacity(
            feed.births.len() + feed.deaths.len() + feed.events.len() + feed.holidays.len(),
        );
        let mut skipped = 0u64;

        let groups = [
            (EventType::Birth, &feed.births),
            (EventType::Death, &feed.deaths),
            (EventType::OnThisDay, &feed.events),
            (EventType::Holiday, &feed.holidays),
        ];
        for (category, entries) in groups {
            for entry in entries.iter() {
                let year = match category {
                    EventType::Holiday => Some(date.year()),
                    _ => entry.year,
                };
                let Some(event_date) = year.and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
                else {
                    tracing::warn!(source = Self::NAME, %category, year = ?entry.year, text = %entry.text, "entry without usable year, skipped");
                    skipped += 1;
                    continue;
                };
                let Some(link) = entry.link() else {
                    tracing::warn!(source = Self::NAME, %category, text = %entry.text, "entry without page link, skipped");
                    skipped += 1;
                    continue;
                };
                out.push(Event::new(
                    self.meta.clone(),
                    event_date,
                    normalize_text(&entry.text),
                    link,
                    category,
                ));
            }
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms", "source" => Self::NAME).record(ms);
        counter!("source_events_total", "source" => Self::NAME).increment(out.len() as u64);
        if skipped > 0 {
            counter!("source_skipped_entries_total", "source" => Self::NAME).increment(skipped);
        }
        Ok(out)
    }
}

#[async_trait]
impl Source for WikipediaSource {
    fn meta(&self) -> &Arc<SourceMeta> {
        &self.meta
    }

    async fn fetch_events(
        &self,
        day: u32,
        month: u32,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Result<Vec<Event>, SourceError> {
        let date = resolve_date(day, month, year, today)?;
        let url = self.template.render(date.year(), month, day);
        tracing::debug!(source = Self::NAME, %url, "fetching feed");
        let body = self.fetcher.get_text(&url).await?;
        self.parse_feed(&body, date)
    }
}

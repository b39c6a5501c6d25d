//! # Event records
//!
//! The unified record every source adapter produces, plus the ordering key the
//! collector sorts by.
//!
//! Equality and ordering are deliberately different relations:
//! - `==` compares `(title, link)` only, so the same fact fetched with a shifted
//!   date is still "the same" record.
//! - The ordering key is `(source weight, single/multi-day, date, category rank, title)`.
//!
//! Because the two disagree, `Event` does not implement `Ord`. Sort with
//! [`Event::cmp_order`] (or [`sort_events`]) instead.

use chrono::NaiveDate;
use serde::Serialize;
use std::{cmp::Ordering, fmt, sync::Arc};

use crate::error::SourceError;

/// Weight applied when neither the adapter nor the config says otherwise.
pub const DEFAULT_WEIGHT: i32 = 10;

/// Category of a fact, from broad celebratory days to narrow biographical facts.
/// Rank values are spaced so new categories fit in without renumbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    NationalDay,
    Holiday,
    OnThisDay,
    Birth,
    Death,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::NationalDay,
        EventType::Holiday,
        EventType::OnThisDay,
        EventType::Birth,
        EventType::Death,
    ];

    pub fn rank(self) -> u8 {
        match self {
            EventType::NationalDay => 10,
            EventType::Holiday => 20,
            EventType::OnThisDay => 30,
            EventType::Birth => 40,
            EventType::Death => 41,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventType::NationalDay => "NATIONAL_DAY",
            EventType::Holiday => "HOLIDAY",
            EventType::OnThisDay => "ON_THIS_DAY",
            EventType::Birth => "BIRTH",
            EventType::Death => "DEATH",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of the adapter a record came from. Shared by every record of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    pub name: String,
    /// Lower sorts first.
    pub weight: i32,
}

impl SourceMeta {
    pub fn new(name: impl Into<String>, weight: i32) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            weight,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub source: Arc<SourceMeta>,
    pub date: NaiveDate,
    pub end_date: NaiveDate,
    pub title: String,
    pub link: String,
    pub category: EventType,
}

/// Borrowed sort key; see module docs for the component order.
pub type OrderKey<'a> = (i32, u8, NaiveDate, u8, &'a str);

impl Event {
    /// Single-day record.
    pub fn new(
        source: Arc<SourceMeta>,
        date: NaiveDate,
        title: impl Into<String>,
        link: impl Into<String>,
        category: EventType,
    ) -> Self {
        Self {
            source,
            date,
            end_date: date,
            title: title.into(),
            link: link.into(),
            category,
        }
    }

    /// Record spanning `date..=end_date`. `None` means a single day.
    pub fn try_span(
        source: Arc<SourceMeta>,
        date: NaiveDate,
        end_date: Option<NaiveDate>,
        title: impl Into<String>,
        link: impl Into<String>,
        category: EventType,
    ) -> Result<Self, SourceError> {
        let end_date = end_date.unwrap_or(date);
        if end_date < date {
            return Err(SourceError::parse(
                source.name.clone(),
                format!("end date {end_date} precedes start date {date}"),
            ));
        }
        let mut ev = Self::new(source, date, title, link, category);
        ev.end_date = end_date;
        Ok(ev)
    }

    pub fn is_single_day(&self) -> bool {
        self.date == self.end_date
    }

    pub fn weight(&self) -> i32 {
        self.source.weight
    }

    pub fn order_key(&self) -> OrderKey<'_> {
        (
            self.source.weight,
            if self.is_single_day() { 0 } else { 1 },
            self.date,
            self.category.rank(),
            self.title.as_str(),
        )
    }

    pub fn cmp_order(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }

    pub fn view(&self) -> EventView<'_> {
        EventView {
            date: self.date,
            end_date: self.end_date,
            category: self.category,
            title: &self.title,
            link: &self.link,
            source: &self.source.name,
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.link == other.link
    }
}

impl Eq for Event {}

/// `YYYY-MM-DD[ - YYYY-MM-DD]: <CATEGORY>: <title> (<link>)`
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))?;
        if !self.is_single_day() {
            write!(f, " - {}", self.end_date.format("%Y-%m-%d"))?;
        }
        write!(f, ": {}: {} ({})", self.category, self.title, self.link)
    }
}

/// Serializable projection used by the JSON output.
#[derive(Debug, Serialize)]
pub struct EventView<'a> {
    pub date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: EventType,
    pub title: &'a str,
    pub link: &'a str,
    pub source: &'a str,
}

/// Stable sort by the ordering key. Full ties keep their input order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(Event::cmp_order);
}

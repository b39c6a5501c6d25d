// src/sources/days_of_the_year.rs
//! Card-based HTML source (daysoftheyear.com).
//!
//! Every `card--day` block on the day page becomes one `NATIONAL_DAY` record.
//! Markup is matched with a handful of anchored regexes rather than a DOM;
//! the page only needs:
//!
//! ```text
//! <div class="card card--day">
//!   <div class="card__date"><div class="date_day">Tue Sep 20th, 2022</div></div>
//!   <h3 class="card__title"><a href="https://…/days/x/">Title</a></h3>
//! </div>
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;

use crate::dates::{resolve_date, CardDate};
use crate::error::{ConfigError, SourceError};
use crate::event::{Event, EventType, SourceMeta};
use crate::sources::{PageFetcher, Source, UrlTemplate};
use crate::text::normalize_text;

/// Fields lifted out of one card, before date parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCard {
    pub date: String,
    pub title: String,
    pub href: String,
}

pub struct DaysOfTheYearSource {
    meta: Arc<SourceMeta>,
    fetcher: Arc<dyn PageFetcher>,
    template: UrlTemplate,
}

impl DaysOfTheYearSource {
    pub const NAME: &'static str = "days_of_the_year";
    pub const URL_TEMPLATE: &'static str =
        "https://www.daysoftheyear.com/days/{year}/{month}/{day}/";

    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        template: &str,
        weight: i32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            meta: SourceMeta::new(Self::NAME, weight),
            fetcher,
            template: UrlTemplate::parse(Self::NAME, template, &["year", "month", "day"])?,
        })
    }

    pub fn url_for(&self, date: NaiveDate) -> String {
        use chrono::Datelike;
        self.template.render(date.year(), date.month(), date.day())
    }

    /// Page HTML in, records out. `page_url` resolves relative card links.
    pub fn parse_page(&self, html: &str, page_url: &str) -> Result<Vec<Event>, SourceError> {
        let t0 = std::time::Instant::now();
        let cards = extract_cards(html).map_err(|e| SourceError::parse(Self::NAME, e))?;
        let base = reqwest::Url::parse(page_url).ok();

        let mut out = Vec::with_capacity(cards.len());
        for card in cards {
            let (date, end_date) = CardDate::parse(&card.date)
                .and_then(CardDate::bounds)
                .map_err(|e| SourceError::parse(Self::NAME, e))?;
            let link = resolve_link(base.as_ref(), &card.href);
            out.push(Event::try_span(
                self.meta.clone(),
                date,
                Some(end_date),
                card.title,
                link,
                EventType::NationalDay,
            )?);
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms", "source" => Self::NAME).record(ms);
        counter!("source_events_total", "source" => Self::NAME).increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl Source for DaysOfTheYearSource {
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
        let url = self.url_for(date);
        tracing::debug!(source = Self::NAME, %url, "fetching day page");
        let html = self.fetcher.get_text(&url).await?;
        self.parse_page(&html, &url)
    }
}

fn class_attr(class: &str) -> String {
    format!(r#"class\s*=\s*"(?:[^"]*\s)?{}(?:\s[^"]*)?""#, regex::escape(class))
}

fn re_card_start() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?is)<[a-z0-9]+[^>]*{}", class_attr("card--day"))).unwrap())
}

/// Any card (day, post, promo). Used to close the previous day card.
fn re_any_card_start() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?is)<[a-z0-9]+[^>]*{}", class_attr("card"))).unwrap())
}

fn re_card_date() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?is)<[a-z0-9]+[^>]*{}", class_attr("card__date"))).unwrap())
}

fn re_date_day() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?is)<div[^>]*{}[^>]*>(.*?)</div>", class_attr("date_day"))).unwrap()
    })
}

/// Opening tag of the title element; group 1 is the tag name.
fn re_card_title() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?is)<([a-z0-9]+)[^>]*{}[^>]*>", class_attr("card__title"))).unwrap()
    })
}

fn re_anchor() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*"([^"]*)"[^>]*>(.*?)</a>"#).unwrap()
    })
}

/// Inner markup of the element whose opening tag ends at `open_end`, up to the
/// first closing tag with the same name.
fn element_inner<'a>(block: &'a str, open_end: usize, tag: &str) -> Option<&'a str> {
    let rest = &block[open_end..];
    let close = rest
        .to_ascii_lowercase()
        .find(&format!("</{}", tag.to_ascii_lowercase()))?;
    Some(&rest[..close])
}

/// Split the page into day-card blocks and pull date/title/link out of each.
/// A block ends where the next card of any kind starts. The link must sit
/// inside the card's own title element; a card missing any of the three is a
/// shape error for the whole page.
pub fn extract_cards(html: &str) -> Result<Vec<RawCard>, String> {
    let starts: Vec<usize> = re_card_start().find_iter(html).map(|m| m.start()).collect();
    let boundaries: Vec<usize> = re_any_card_start()
        .find_iter(html)
        .map(|m| m.start())
        .collect();

    let mut out = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = boundaries
            .iter()
            .copied()
            .find(|&b| b > start)
            .unwrap_or(html.len());
        let block = &html[start..end];

        let date_at = re_card_date()
            .find(block)
            .ok_or_else(|| format!("card #{i}: no card__date block"))?
            .start();
        let date = re_date_day()
            .captures(&block[date_at..])
            .map(|c| normalize_text(&c[1]))
            .ok_or_else(|| format!("card #{i}: no date_day element"))?;

        let title_open = re_card_title()
            .captures(block)
            .ok_or_else(|| format!("card #{i}: no card__title block"))?;
        let open_end = title_open
            .get(0)
            .map(|m| m.end())
            .ok_or_else(|| format!("card #{i}: no card__title block"))?;
        let title_inner = element_inner(block, open_end, &title_open[1])
            .ok_or_else(|| format!("card #{i}: unclosed card__title element"))?;
        let anchor = re_anchor()
            .captures(title_inner)
            .ok_or_else(|| format!("card #{i}: no link inside card__title"))?;
        let href = html_escape::decode_html_entities(anchor[1].trim()).to_string();
        let title = normalize_text(&anchor[2]);

        if title.is_empty() || href.is_empty() {
            return Err(format!("card #{i}: empty title or link"));
        }
        out.push(RawCard { date, title, href });
    }
    Ok(out)
}

fn resolve_link(base: Option<&reqwest::Url>, href: &str) -> String {
    match base.and_then(|b| b.join(href).ok()) {
        Some(u) => u.to_string(),
        None => href.to_string(),
    }
}

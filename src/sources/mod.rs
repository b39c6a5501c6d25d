// src/sources/mod.rs
pub mod days_of_the_year;
pub mod fetch;
pub mod wikipedia;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::SourceConfig;
use crate::error::{ConfigError, SourceError};
use crate::event::{Event, SourceMeta};
use crate::source_weights::SourceWeightsConfig;

pub use days_of_the_year::DaysOfTheYearSource;
pub use fetch::{FixtureFetcher, HttpFetcher, PageFetcher};
pub use wikipedia::WikipediaSource;

/// One upstream provider, normalized into [`Event`] records.
///
/// `today` is the reference date for the "next occurrence" rule when `year`
/// is `None`; see [`crate::dates::resolve_date`].
#[async_trait]
pub trait Source: Send + Sync {
    fn meta(&self) -> &Arc<SourceMeta>;

    fn name(&self) -> &str {
        &self.meta().name
    }

    /// Lower sorts first.
    fn weight(&self) -> i32 {
        self.meta().weight
    }

    async fn fetch_events(
        &self,
        day: u32,
        month: u32,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Result<Vec<Event>, SourceError>;
}

/// Known adapters, as named in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    DaysOfTheYear,
    Wikipedia,
}

impl SourceKind {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "days_of_the_year" | "daysoftheyear" => Ok(SourceKind::DaysOfTheYear),
            "wikipedia" => Ok(SourceKind::Wikipedia),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::DaysOfTheYear => DaysOfTheYearSource::NAME,
            SourceKind::Wikipedia => WikipediaSource::NAME,
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            SourceKind::DaysOfTheYear => DaysOfTheYearSource::URL_TEMPLATE,
            SourceKind::Wikipedia => WikipediaSource::URL_TEMPLATE,
        }
    }
}

/// URL with `{year}`, `{month}` and `{day}` placeholders, zero-padded to 4/2/2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    /// Checks placeholders and that a rendered sample is an absolute http(s) URL.
    pub fn parse(
        source_name: &str,
        template: &str,
        required: &[&str],
    ) -> Result<Self, ConfigError> {
        let fail = |reason: String| ConfigError::UrlTemplate {
            source_name: source_name.to_string(),
            template: template.to_string(),
            reason,
        };

        for ph in required {
            if !template.contains(&format!("{{{ph}}}")) {
                return Err(fail(format!("missing `{{{ph}}}` placeholder")));
            }
        }

        let t = Self(template.to_string());
        let sample = t.render(2000, 1, 1);
        if sample.contains('{') || sample.contains('}') {
            return Err(fail("unknown placeholder".into()));
        }
        let url = reqwest::Url::parse(&sample).map_err(|e| fail(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(fail(format!("unsupported scheme `{}`", url.scheme())));
        }
        Ok(t)
    }

    pub fn render(&self, year: i32, month: u32, day: u32) -> String {
        self.0
            .replace("{year}", &format!("{year:04}"))
            .replace("{month}", &format!("{month:02}"))
            .replace("{day}", &format!("{day:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Build the registry from config, in config order. Disabled entries are skipped.
/// Any malformed entry fails the whole build.
pub fn build_sources(
    entries: &[SourceConfig],
    weights: &SourceWeightsConfig,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<Vec<Box<dyn Source>>, ConfigError> {
    let mut out: Vec<Box<dyn Source>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let kind = SourceKind::parse(&entry.kind)?;
        if !entry.enabled {
            tracing::info!(source = kind.name(), "source disabled in config");
            continue;
        }
        let weight = entry
            .weight
            .unwrap_or_else(|| weights.weight_for(kind.name()));
        let template = entry
            .url_template
            .as_deref()
            .unwrap_or(kind.default_template());

        let source: Box<dyn Source> = match kind {
            SourceKind::DaysOfTheYear => Box::new(DaysOfTheYearSource::new(
                fetcher.clone(),
                template,
                weight,
            )?),
            SourceKind::Wikipedia => {
                Box::new(WikipediaSource::new(fetcher.clone(), template, weight)?)
            }
        };
        tracing::debug!(source = source.name(), weight, "source registered");
        out.push(source);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_renders_zero_padded() {
        let t = UrlTemplate::parse(
            "t",
            "https://example.test/days/{year}/{month}/{day}/",
            &["year", "month", "day"],
        )
        .unwrap();
        assert_eq!(t.render(2022, 8, 2), "https://example.test/days/2022/08/02/");
    }

    #[test]
    fn template_errors_are_config_errors() {
        let req = ["month", "day"];
        for bad in [
            "https://example.test/{month}",
            "https://example.test/{month}/{day}/{week}",
            "example.test/{month}/{day}",
            "ftp://example.test/{month}/{day}",
        ] {
            assert!(
                matches!(
                    UrlTemplate::parse("t", bad, &req),
                    Err(ConfigError::UrlTemplate { .. })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn source_kind_names() {
        assert_eq!(
            SourceKind::parse("Days-Of-The-Year").unwrap(),
            SourceKind::DaysOfTheYear
        );
        assert_eq!(SourceKind::parse("wikipedia").unwrap(), SourceKind::Wikipedia);
        assert!(matches!(
            SourceKind::parse("onthisday.com"),
            Err(ConfigError::UnknownSource(_))
        ));
    }

    #[test]
    fn build_respects_order_enabled_and_weights() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FixtureFetcher::new());
        let entries = vec![
            SourceConfig {
                kind: "wikipedia".into(),
                enabled: true,
                url_template: None,
                weight: Some(3),
            },
            SourceConfig {
                kind: "days_of_the_year".into(),
                enabled: true,
                url_template: None,
                weight: None,
            },
            SourceConfig {
                kind: "wikipedia".into(),
                enabled: false,
                url_template: None,
                weight: None,
            },
        ];
        let weights = SourceWeightsConfig::default_seed();
        let sources = build_sources(&entries, &weights, fetcher).unwrap();
        let got: Vec<(&str, i32)> = sources.iter().map(|s| (s.name(), s.weight())).collect();
        assert_eq!(
            got,
            vec![
                ("wikipedia", 3),
                ("days_of_the_year", weights.weight_for("days_of_the_year")),
            ]
        );
    }

    #[test]
    fn build_fails_on_bad_template() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FixtureFetcher::new());
        let entries = vec![SourceConfig {
            kind: "days_of_the_year".into(),
            enabled: true,
            url_template: Some("https://x.test/{day}".into()),
            weight: None,
        }];
        let res = build_sources(&entries, &SourceWeightsConfig::default_seed(), fetcher);
        assert!(matches!(res, Err(ConfigError::UrlTemplate { .. })));
    }
}

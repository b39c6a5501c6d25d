// src/error.rs
use thiserror::Error;

/// Per-run failure of a single source. The collector isolates these to the
/// offending source; the rest of the batch still goes through.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("{source_name}: unexpected payload: {reason}")]
    Parse { source_name: String, reason: String },
    #[error("invalid request date: day={day} month={month} year={year:?}")]
    InvalidDate {
        day: u32,
        month: u32,
        year: Option<i32>,
    },
}

impl SourceError {
    pub fn parse(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SourceError::Parse {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        SourceError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Fetch { .. } => "fetch",
            SourceError::Parse { .. } => "parse",
            SourceError::InvalidDate { .. } => "invalid_date",
        }
    }
}

/// Startup misconfiguration. Never produced during a collection run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source `{source_name}`: malformed url template `{template}`: {reason}")]
    UrlTemplate {
        source_name: String,
        template: String,
        reason: String,
    },
    #[error("unknown source kind `{0}`")]
    UnknownSource(String),
    #[error("http client: {0}")]
    Http(String),
}

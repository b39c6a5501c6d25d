// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::source_weights::SourceWeightsConfig;

pub const ENV_CONFIG_PATH: &str = "ONTHISDAY_CONFIG_PATH";
const DEFAULT_TOML: &str = "config/onthisday.toml";
const DEFAULT_JSON: &str = "config/onthisday.json";

fn default_timeout_secs() -> u64 {
    10
}
fn default_max_retries() -> u8 {
    2
}
fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_enabled() -> bool {
    true
}
fn default_sources() -> Vec<SourceConfig> {
    ["days_of_the_year", "wikipedia"]
        .into_iter()
        .map(|kind| SourceConfig {
            kind: kind.to_string(),
            enabled: true,
            url_template: None,
            weight: None,
        })
        .collect()
}

/// Policy for the HTTP collaborator. The core never reads these directly.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts per request (at least 1).
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

/// One registry entry. Order in the file is registry order.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// `days_of_the_year` | `wikipedia`
    pub kind: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Overrides the adapter's built-in URL; `{year}`, `{month}`, `{day}` placeholders.
    #[serde(default)]
    pub url_template: Option<String>,
    /// Overrides the `[weights]` lookup for this entry.
    #[serde(default)]
    pub weight: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub weights: SourceWeightsConfig,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            weights: SourceWeightsConfig::default(),
            sources: default_sources(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&content, &ext).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $ONTHISDAY_CONFIG_PATH
    /// 2) config/onthisday.toml
    /// 3) config/onthisday.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        for candidate in [DEFAULT_TOML, DEFAULT_JSON] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    fn parse(s: &str, hint_ext: &str) -> Result<Self> {
        match hint_ext {
            "json" => Ok(serde_json::from_str(s)?),
            "toml" => Ok(toml::from_str(s)?),
            _ => toml::from_str(s)
                .map_err(anyhow::Error::from)
                .or_else(|_| serde_json::from_str(s).map_err(anyhow::Error::from))
                .map_err(|_| anyhow!("unsupported config format")),
        }
    }
}

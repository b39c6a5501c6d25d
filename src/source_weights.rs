//! # Source Weights
//!
//! Maps source names (e.g. "days_of_the_year", "wikipedia") to integer
//! priority weights. Lower weights sort earlier in the collected list.
//!
//! - Loaded from the `[weights]` section of the app config (or defaults).
//! - Case-insensitive lookup with normalization of dashes, dots and spaces.
//! - Aliases map alternative spellings/hosts to canonical source names.
//! - Fallback order: aliases → exact match → default.
//! - Built-in `default_seed()` puts national days ahead of the Wikipedia feed.

use serde::Deserialize;
use std::collections::HashMap;

use crate::event::DEFAULT_WEIGHT;

#[derive(Debug, Clone, Deserialize)]
pub struct SourceWeightsConfig {
    /// Weight if no match is found.
    #[serde(default = "default_default_weight")]
    pub default_weight: i32,
    /// Explicit weights for canonical source names.
    #[serde(default)]
    pub weights: HashMap<String, i32>,
    /// Aliases mapping non-canonical names → canonical names.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_default_weight() -> i32 {
    DEFAULT_WEIGHT
}

impl Default for SourceWeightsConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SourceWeightsConfig {
    /// Weight for a source name: alias → exact → default.
    pub fn weight_for(&self, source: &str) -> i32 {
        let s = normalize(source);

        // 1) Alias resolution.
        if let Some(canon) = self.aliases.get(&s) {
            if let Some(&w) = self.weights.get(&normalize(canon)) {
                return w;
            }
        }

        // 2) Exact weight match (config keys are normalized too).
        if let Some(&w) = self.weights.get(&s) {
            return w;
        }
        for (k, &w) in &self.weights {
            if normalize(k) == s {
                return w;
            }
        }

        // 3) Default.
        self.default_weight
    }

    pub(crate) fn default_seed() -> Self {
        let mut weights = HashMap::new();
        let mut aliases = HashMap::new();

        for (k, v) in [("days of the year", 10), ("wikipedia", 20)] {
            weights.insert(k.to_string(), v);
        }

        for (a, c) in [
            ("daysoftheyear", "days of the year"),
            ("daysoftheyear com", "days of the year"),
            ("www daysoftheyear com", "days of the year"),
            ("en wikipedia org", "wikipedia"),
            ("wiki", "wikipedia"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self {
            default_weight: DEFAULT_WEIGHT,
            weights,
            aliases,
        }
    }
}

/// Lowercase, replace separators/punctuation with spaces, collapse spaces.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();

    for ch in ['—', '–', '-', '_', '/', '\\', '.', ','] {
        out = out.replace(ch, " ");
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SourceWeightsConfig {
        SourceWeightsConfig::default_seed()
    }

    #[test]
    fn exact_match_through_normalization() {
        let c = cfg();
        assert_eq!(c.weight_for("days_of_the_year"), 10);
        assert_eq!(c.weight_for("Days-Of-The-Year"), 10);
        assert_eq!(c.weight_for("WIKIPEDIA"), 20);
    }

    #[test]
    fn alias_match() {
        let c = cfg();
        assert_eq!(c.weight_for("www.daysoftheyear.com"), 10);
        assert_eq!(c.weight_for("en.wikipedia.org"), 20);
    }

    #[test]
    fn default_weight_used() {
        let c = cfg();
        assert_eq!(c.weight_for("onthisday.com"), DEFAULT_WEIGHT);
    }

    #[test]
    fn config_keys_with_underscores_match() {
        let c: SourceWeightsConfig =
            toml::from_str("default_weight = 50\n[weights]\nwikipedia = 1\ndays_of_the_year = 2\n")
                .unwrap();
        assert_eq!(c.weight_for("wikipedia"), 1);
        assert_eq!(c.weight_for("days_of_the_year"), 2);
        assert_eq!(c.weight_for("other"), 50);
    }
}

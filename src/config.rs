//! Runtime configuration supplied by the host page.
//!
//! Every field has a default, so `"{}"` is a valid configuration. Keys use the
//! camelCase spelling the page scripts already use.

use serde::{Deserialize, Serialize};

/// How the fuzzy bonus compares a query term against an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FuzzyMode {
    /// Edit distance against the whole lower-cased entry text.
    #[default]
    WholeText,
    /// Edit distance against each whitespace-separated word; the closest wins.
    PerWord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub history_key: String,
    pub max_history: usize,
    pub max_results: usize,
    /// Queries shorter than this (in chars) are not searched
    pub min_query_length: usize,
    /// Element text must be strictly longer than this to be indexed
    pub min_text_length: usize,
    /// Keywords must be strictly longer than this
    pub min_keyword_length: usize,
    /// Fuzzy bonus applies when the distance is strictly below this
    pub fuzzy_threshold: usize,
    pub fuzzy_mode: FuzzyMode,
    /// CSS selector list scanned when building the index in the browser
    pub selectors: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            history_key: "searchHistory".to_string(),
            max_history: 10,
            max_results: 20,
            min_query_length: 2,
            min_text_length: 2,
            min_keyword_length: 3,
            fuzzy_threshold: 3,
            fuzzy_mode: FuzzyMode::WholeText,
            selectors: "h1, h2, h3, h4, p, a, span, li".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    pub storage_key: String,
    /// Number of chars of a clicked element's text kept on the event
    pub click_text_limit: usize,
    /// Scroll milestones are multiples of this percentage
    pub milestone_step: u32,
    pub top_pages: usize,
    pub heatmap_width: u32,
    pub heatmap_height: u32,
    /// Radius of one click's gradient; the painted square is twice this wide
    pub heatmap_radius: u32,
    /// Keep at most this many heatmap points (newest win). `None` never evicts.
    pub heatmap_retention: Option<usize>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            storage_key: "portfolioAnalytics".to_string(),
            click_text_limit: 50,
            milestone_step: 25,
            top_pages: 5,
            heatmap_width: 800,
            heatmap_height: 600,
            heatmap_radius: 30,
            heatmap_retention: None,
        }
    }
}

/// Top-level configuration: `{"search": {...}, "analytics": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub search: SearchConfig,
    pub analytics: AnalyticsConfig,
}

impl SiteConfig {
    /// Parse a configuration from JSON. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(SiteConfig::default());
        }
        serde_json::from_str(json)
    }
}

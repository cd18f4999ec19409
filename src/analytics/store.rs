//! The durable analytics record and its parts.
//!
//! Field names match the JSON the site has always stored under
//! `portfolioAnalytics`, so existing browser data loads unchanged.

use crate::types::OrderedMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsStore {
    /// page path -> view count
    pub page_views: OrderedMap<u64>,
    pub sessions: Vec<Session>,
    pub events: Vec<StoredEvent>,
    pub heatmap_data: Vec<HeatmapPoint>,
    /// Not written by the tracker; kept so it survives a round trip
    pub user_flow: Vec<serde_json::Value>,
    /// page path -> timings of its latest load
    pub performance: OrderedMap<PerformanceMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub start_time: i64,
    pub pages: Vec<String>,
    pub device: DeviceInfo,
    #[serde(default)]
    pub referrer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub width: f64,
    pub height: f64,
    #[serde(alias = "userAgentString")]
    pub user_agent: String,
    pub platform: String,
    pub language: String,
}

/// One tracked event, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalyticsEvent {
    #[serde(rename = "click")]
    Click {
        element: String,
        text: String,
        x: f64,
        y: f64,
        timestamp: i64,
        page: String,
    },
    #[serde(rename = "scroll")]
    Scroll {
        depth: u32,
        timestamp: i64,
        page: String,
    },
    #[serde(rename = "timeOnPage")]
    TimeOnPage {
        /// seconds
        duration: u64,
        timestamp: i64,
        page: String,
    },
}

/// An entry of the stored event list. Entries that do not parse as an
/// [`AnalyticsEvent`] (unknown kinds, missing fields) are kept verbatim so a
/// save writes them back unchanged; they are never counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredEvent {
    Known(AnalyticsEvent),
    Raw(serde_json::Value),
}

impl StoredEvent {
    pub fn known(&self) -> Option<&AnalyticsEvent> {
        match self {
            StoredEvent::Known(event) => Some(event),
            StoredEvent::Raw(_) => None,
        }
    }
}

impl From<AnalyticsEvent> for StoredEvent {
    fn from(event: AnalyticsEvent) -> Self {
        StoredEvent::Known(event)
    }
}

/// Viewport-relative click position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub x: f64,
    pub y: f64,
}

/// Navigation timings in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceMetrics {
    pub load_time: f64,
    pub dom_ready: f64,
    pub first_paint: f64,
}

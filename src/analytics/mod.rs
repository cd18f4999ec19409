//! Local usage analytics.
//!
//! - [`tracker`] records page views, sessions, clicks, scroll milestones,
//!   time on page and navigation timings into one durable record
//! - [`aggregate`] computes the dashboard figures from that record
//! - [`heatmap`] rasterizes recorded click positions
//! - [`render`] produces the dashboard tab markup
//!
//! Everything stays in the browser's local storage; nothing is sent anywhere.

pub mod aggregate;
pub mod heatmap;
pub mod render;
pub mod store;
pub mod tracker;

pub use aggregate::{AnalyticsSummary, PageRank};
pub use store::{
    AnalyticsEvent, AnalyticsStore, DeviceInfo, HeatmapPoint, PerformanceMetrics, Session,
    StoredEvent,
};
pub use tracker::{ClickTarget, ScrollTracker, UsageAnalytics};

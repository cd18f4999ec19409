//! Event recording.
//!
//! Every tracking call mutates the in-memory [`AnalyticsStore`] and then
//! rewrites the whole record to durable storage. A failed write is logged and
//! forgotten; the next successful write carries everything accumulated so far.

use crate::analytics::aggregate::{summarize, AnalyticsSummary};
use crate::analytics::store::{
    AnalyticsEvent, AnalyticsStore, DeviceInfo, HeatmapPoint, PerformanceMetrics, Session,
};
use crate::clock::{session_id, Clock, SystemClock};
use crate::config::AnalyticsConfig;
use crate::error::StorageError;
use crate::storage::{load_json, save_json, KeyValueStore};
use tracing::{debug, warn};

/// The element a click landed on (or inside of)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    pub tag: String,
    pub text: String,
}

/// Running maximum scroll depth and the milestones it has passed
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    step: u32,
    max_depth: u32,
}

impl ScrollTracker {
    pub fn new(step: u32) -> Self {
        ScrollTracker { step, max_depth: 0 }
    }

    /// Feed a scroll percentage; returns the milestones crossed for the first
    /// time, in ascending order.
    pub fn advance(&mut self, percent: f64) -> Vec<u32> {
        if !percent.is_finite() {
            return Vec::new();
        }
        let depth = percent.round().clamp(0.0, 100.0) as u32;
        if depth <= self.max_depth {
            return Vec::new();
        }

        let mut crossed = Vec::new();
        if self.step > 0 {
            let mut milestone = (self.max_depth / self.step + 1) * self.step;
            while milestone <= depth {
                crossed.push(milestone);
                milestone += self.step;
            }
        }
        self.max_depth = depth;
        crossed
    }
}

/// Per-page-load analytics service
pub struct UsageAnalytics<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    config: AnalyticsConfig,
    data: AnalyticsStore,
    page: String,
    session_id: String,
    started_at: i64,
    scroll: ScrollTracker,
    time_recorded: bool,
}

impl<S: KeyValueStore> UsageAnalytics<S, SystemClock> {
    pub fn new(store: S, config: AnalyticsConfig, page: impl Into<String>) -> Self {
        Self::with_clock(store, SystemClock, config, page)
    }
}

impl<S: KeyValueStore, C: Clock> UsageAnalytics<S, C> {
    /// Create the tracker for the current page load. The time-on-page clock
    /// starts now; stored data is not read until [`load`](Self::load).
    pub fn with_clock(
        store: S,
        clock: C,
        config: AnalyticsConfig,
        page: impl Into<String>,
    ) -> Self {
        let now = clock.now_ms();
        let scroll = ScrollTracker::new(config.milestone_step);
        UsageAnalytics {
            store,
            clock,
            config,
            data: AnalyticsStore::default(),
            page: page.into(),
            session_id: session_id(now),
            started_at: now,
            scroll,
            time_recorded: false,
        }
    }

    /// Replace the in-memory record with the stored one. Missing or corrupt
    /// data leaves an empty record.
    pub fn load(&mut self) {
        self.data = load_json(&self.store, &self.config.storage_key);
        debug!(
            sessions = self.data.sessions.len(),
            events = self.data.events.len(),
            "analytics loaded"
        );
    }

    /// Write the whole record to durable storage.
    pub fn flush(&self) -> Result<(), StorageError> {
        save_json(&self.store, &self.config.storage_key, &self.data)
    }

    fn save(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to save analytics");
        }
    }

    pub fn data(&self) -> &AnalyticsStore {
        &self.data
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn summary(&self) -> AnalyticsSummary {
        summarize(&self.data, self.config.top_pages)
    }

    /// Count one view of the current page.
    pub fn track_page_view(&mut self) {
        *self.data.page_views.entry(self.page.clone()).or_insert(0) += 1;
        self.save();
    }

    /// Append this load's session record. It is never updated afterwards.
    pub fn start_session(&mut self, device: DeviceInfo, referrer: &str) {
        self.data.sessions.push(Session {
            id: self.session_id.clone(),
            start_time: self.started_at,
            pages: vec![self.page.clone()],
            device,
            referrer: referrer.to_string(),
        });
        self.save();
    }

    /// Record a click at viewport position (`x`, `y`).
    ///
    /// Every click lands in the heatmap. A click event is only added when the
    /// click hit a link, button or button-role element.
    pub fn record_click(&mut self, x: f64, y: f64, target: Option<ClickTarget>) {
        if let Some(target) = target {
            let text: String = target
                .text
                .trim()
                .chars()
                .take(self.config.click_text_limit)
                .collect();
            let event = AnalyticsEvent::Click {
                element: target.tag,
                text,
                x,
                y,
                timestamp: self.clock.now_ms(),
                page: self.page.clone(),
            };
            self.data.events.push(event.into());
        }

        self.data.heatmap_data.push(HeatmapPoint { x, y });
        if let Some(cap) = self.config.heatmap_retention {
            let len = self.data.heatmap_data.len();
            if len > cap {
                self.data.heatmap_data.drain(..len - cap);
            }
        }
        self.save();
    }

    /// Feed the current scroll position. Each milestone (25, 50, 75, 100 by
    /// default) is recorded at most once per page load. Returns the
    /// milestones recorded by this call.
    pub fn observe_scroll(
        &mut self,
        scroll_y: f64,
        document_height: f64,
        viewport_height: f64,
    ) -> Vec<u32> {
        let scrollable = document_height - viewport_height;
        if scrollable <= 0.0 {
            return Vec::new();
        }

        let crossed = self.scroll.advance(scroll_y / scrollable * 100.0);
        if crossed.is_empty() {
            return crossed;
        }

        let timestamp = self.clock.now_ms();
        for depth in &crossed {
            let event = AnalyticsEvent::Scroll {
                depth: *depth,
                timestamp,
                page: self.page.clone(),
            };
            self.data.events.push(event.into());
        }
        self.save();
        crossed
    }

    /// Record how long the page has been open, in whole seconds. Only the
    /// first call per page load records anything.
    pub fn record_time_on_page(&mut self) -> Option<u64> {
        if self.time_recorded {
            return None;
        }
        let now = self.clock.now_ms();
        let duration = ((now - self.started_at).max(0) as f64 / 1000.0).round() as u64;

        let event = AnalyticsEvent::TimeOnPage {
            duration,
            timestamp: now,
            page: self.page.clone(),
        };
        self.data.events.push(event.into());
        self.time_recorded = true;
        self.save();
        Some(duration)
    }

    /// Store this load's navigation timings, replacing the page's previous
    /// entry.
    pub fn record_performance(&mut self, metrics: PerformanceMetrics) {
        self.data.performance.insert(self.page.clone(), metrics);
        self.save();
    }
}

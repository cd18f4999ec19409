//! Read-only summaries over an [`AnalyticsStore`].

use crate::analytics::store::{AnalyticsEvent, AnalyticsStore, StoredEvent};
use crate::rank::top_n;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRank {
    pub path: String,
    pub views: u64,
}

/// Figures shown on the dashboard's overview tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_page_views: u64,
    pub total_sessions: usize,
    /// seconds, rounded
    pub average_session_time: u64,
    pub total_clicks: usize,
    pub top_pages: Vec<PageRank>,
}

pub fn total_page_views(store: &AnalyticsStore) -> u64 {
    store.page_views.values().sum()
}

pub fn total_clicks(store: &AnalyticsStore) -> usize {
    store
        .events
        .iter()
        .filter_map(StoredEvent::known)
        .filter(|e| matches!(e, AnalyticsEvent::Click { .. }))
        .count()
}

/// Mean of all time-on-page durations, rounded to whole seconds; 0 if none
pub fn average_session_time(store: &AnalyticsStore) -> u64 {
    let durations: Vec<u64> = store
        .events
        .iter()
        .filter_map(StoredEvent::known)
        .filter_map(|e| match e {
            AnalyticsEvent::TimeOnPage { duration, .. } => Some(*duration),
            _ => None,
        })
        .collect();
    if durations.is_empty() {
        return 0;
    }
    let total: u64 = durations.iter().sum();
    (total as f64 / durations.len() as f64).round() as u64
}

/// Most viewed pages, highest first, ties in the order pages were first seen
pub fn top_pages(store: &AnalyticsStore, n: usize) -> Vec<PageRank> {
    let pages: Vec<PageRank> = store
        .page_views
        .iter()
        .map(|(path, views)| PageRank {
            path: path.to_string(),
            views: *views,
        })
        .collect();
    top_n(pages, n, |page| page.views)
}

pub fn summarize(store: &AnalyticsStore, top: usize) -> AnalyticsSummary {
    AnalyticsSummary {
        total_page_views: total_page_views(store),
        total_sessions: store.sessions.len(),
        average_session_time: average_session_time(store),
        total_clicks: total_clicks(store),
        top_pages: top_pages(store, top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: &str, extra: &str) -> String {
        format!(r#"{{"type": "{}", "timestamp": 0, "page": "/"{}}}"#, kind, extra)
    }

    fn click() -> String {
        event("click", r#", "element": "A", "text": "", "x": 0, "y": 0"#)
    }

    fn time_on_page(duration: u64) -> String {
        event("timeOnPage", &format!(r#", "duration": {}"#, duration))
    }

    #[test]
    fn test_top_pages_order() {
        let store: AnalyticsStore =
            serde_json::from_str(r#"{"pageViews": {"/a": 3, "/b": 7, "/c": 1}}"#).unwrap();
        let paths: Vec<String> = top_pages(&store, 5).into_iter().map(|p| p.path).collect();
        assert_eq!(paths, vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn test_top_pages_ties_and_limit() {
        let store: AnalyticsStore = serde_json::from_str(
            r#"{"pageViews": {"/1": 2, "/2": 5, "/3": 2, "/4": 2, "/5": 1, "/6": 2, "/7": 2}}"#,
        )
        .unwrap();
        let paths: Vec<String> = top_pages(&store, 5).into_iter().map(|p| p.path).collect();
        assert_eq!(paths, vec!["/2", "/1", "/3", "/4", "/6"]);
    }

    #[test]
    fn test_average_and_clicks() {
        let json = format!(
            r#"{{"events": [{}, {}, {}, {}, {}, {}]}}"#,
            click(),
            time_on_page(30),
            click(),
            click(),
            time_on_page(50),
            click()
        );
        let store: AnalyticsStore = serde_json::from_str(&json).unwrap();
        assert_eq!(average_session_time(&store), 40);
        assert_eq!(total_clicks(&store), 4);
    }

    #[test]
    fn test_average_rounds() {
        let json = format!(r#"{{"events": [{}, {}]}}"#, time_on_page(1), time_on_page(2));
        let store: AnalyticsStore = serde_json::from_str(&json).unwrap();
        assert_eq!(average_session_time(&store), 2);
    }

    #[test]
    fn test_unparsed_events_not_counted() {
        let json = format!(
            r#"{{"events": [{}, {}, {}, {}]}}"#,
            click(),
            event("click", r#", "element": "A""#),
            event("hover", ""),
            time_on_page(20)
        );
        let store: AnalyticsStore = serde_json::from_str(&json).unwrap();
        assert_eq!(store.events.len(), 4);
        assert_eq!(total_clicks(&store), 1);
        assert_eq!(average_session_time(&store), 20);
    }

    #[test]
    fn test_empty_store_summary() {
        let summary = summarize(&AnalyticsStore::default(), 5);
        assert_eq!(summary.total_page_views, 0);
        assert_eq!(summary.total_sessions, 0);
        assert_eq!(summary.average_session_time, 0);
        assert_eq!(summary.total_clicks, 0);
        assert!(summary.top_pages.is_empty());
    }

    #[test]
    fn test_total_page_views() {
        let store: AnalyticsStore =
            serde_json::from_str(r#"{"pageViews": {"/a": 3, "/b": 7, "/c": 1}}"#).unwrap();
        assert_eq!(summarize(&store, 5).total_page_views, 11);
    }
}

//! Client-side search and usage analytics for a static portfolio site.
//!
//! Two independent services, both persisting to the browser's local storage:
//!
//! - [`SearchIndexer`] indexes the visible text of the current page and ranks
//!   it against typed queries with substring, prefix and edit-distance
//!   signals, keeping a short search history.
//! - [`UsageAnalytics`] records page views, sessions, clicks, scroll depth,
//!   time on page and load timings, and summarizes them for a dashboard.
//!
//! The core is plain Rust over the [`KeyValueStore`] and [`TextSource`]
//! traits. The `web` module (wasm32 only) binds them to `localStorage` and
//! the DOM and exports `SiteSearch` / `SiteAnalytics` to JavaScript.

pub mod analytics;
pub mod build;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod parse;
pub mod rank;
pub mod render;
pub mod search;
pub mod storage;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use analytics::{AnalyticsStore, AnalyticsSummary, UsageAnalytics};
pub use build::TextSource;
pub use config::{AnalyticsConfig, FuzzyMode, SearchConfig, SiteConfig};
pub use error::StorageError;
pub use search::SearchIndexer;
pub use storage::{KeyValueStore, MemoryStore};
pub use types::{FilterType, IndexEntry, ScoredEntry, TextFragment};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::rc::Rc;

    fn portfolio_page() -> Vec<TextFragment> {
        vec![
            TextFragment::new("React Developer", "h1"),
            TextFragment::new("Node Backend", "h2"),
            TextFragment::new("CSS Styling", "li"),
            TextFragment::new("Projects", "a"),
            TextFragment::new("I build React apps and Node services.", "p"),
        ]
    }

    #[test]
    fn test_services_share_one_store() {
        let store = Rc::new(MemoryStore::new());
        let config = SiteConfig::from_json("{}").unwrap();

        let mut search = SearchIndexer::new(Rc::clone(&store), config.search.clone());
        search.load();
        search.build(&portfolio_page(), "/");

        let mut analytics = UsageAnalytics::with_clock(
            Rc::clone(&store),
            ManualClock::new(0),
            config.analytics.clone(),
            "/",
        );
        analytics.load();
        analytics.track_page_view();

        let results = search.perform_search("react", FilterType::All).unwrap();
        assert_eq!(results[0].entry.text, "React Developer");
        assert_eq!(results.len(), 2);

        assert!(store.raw("searchHistory").is_some());
        assert!(store.raw("portfolioAnalytics").is_some());
    }

    #[test]
    fn test_search_results_as_json() {
        let mut search = SearchIndexer::new(MemoryStore::new(), SearchConfig::default());
        search.build(&portfolio_page(), "/index.html");

        let json = serde_json::to_string(&search.query("node", FilterType::All)).unwrap();
        let results: Vec<ScoredEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.text, "Node Backend");
        assert_eq!(results[0].score, 15);
        assert_eq!(results[0].entry.page_url, "/index.html");
    }
}

//! Page search service.
//!
//! [`SearchIndexer`] owns the per-page index and the durable search history.
//! The composition root constructs it, calls [`SearchIndexer::load`] and
//! [`SearchIndexer::build`] once per page load, then hands it to whichever UI
//! code needs it.

use crate::build::{build_index, BuildOptions, TextSource};
use crate::config::SearchConfig;
use crate::error::StorageError;
use crate::history::SearchHistory;
use crate::parse::split_terms;
use crate::rank::{score_text, top_n, FuzzyRule};
use crate::storage::{load_json, save_json, KeyValueStore};
use crate::types::{FilterType, IndexEntry, ScoredEntry};
use tracing::{debug, warn};

#[cfg(feature = "native")]
use rayon::prelude::*;

pub struct SearchIndexer<S: KeyValueStore> {
    store: S,
    config: SearchConfig,
    entries: Vec<IndexEntry>,
    /// Lower-cased entry text, parallel to `entries`
    lowered: Vec<String>,
    history: SearchHistory,
}

impl<S: KeyValueStore> SearchIndexer<S> {
    /// Create an indexer with an empty index and history. Nothing is read
    /// from the store until [`load`](Self::load).
    pub fn new(store: S, config: SearchConfig) -> Self {
        SearchIndexer {
            store,
            config,
            entries: Vec::new(),
            lowered: Vec::new(),
            history: SearchHistory::new(),
        }
    }

    /// Reload the search history from durable storage. A corrupt payload is
    /// logged and replaced by an empty history.
    pub fn load(&mut self) {
        self.history = load_json(&self.store, &self.config.history_key);
        self.history.enforce_cap(self.config.max_history);
        debug!(entries = self.history.len(), "search history loaded");
    }

    /// Persist the search history.
    pub fn flush(&self) -> Result<(), StorageError> {
        save_json(&self.store, &self.config.history_key, &self.history)
    }

    /// Replace the index with the text currently provided by `source`.
    pub fn build<T: TextSource + ?Sized>(&mut self, source: &T, page_url: &str) {
        let options = BuildOptions {
            min_text_length: self.config.min_text_length,
            min_keyword_length: self.config.min_keyword_length,
        };
        self.entries = build_index(source, page_url, options);
        self.lowered = self.entries.iter().map(|e| e.text.to_lowercase()).collect();
        debug!(page = page_url, entries = self.entries.len(), "search index built");
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Whether `query` is long enough to be searched at all
    pub fn is_searchable(&self, query: &str) -> bool {
        query.chars().count() >= self.config.min_query_length
    }

    /// Rank index entries against `query`.
    ///
    /// Returns at most `max_results` entries with a positive score, highest
    /// first, ties in index order. Queries below the minimum length yield
    /// nothing. `filter` does not narrow the results.
    pub fn query(&self, query: &str, filter: FilterType) -> Vec<ScoredEntry> {
        if !self.is_searchable(query) {
            return Vec::new();
        }
        let terms = split_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let start = chrono::Utc::now();
        let rule = FuzzyRule {
            mode: self.config.fuzzy_mode,
            threshold: self.config.fuzzy_threshold,
        };
        let scores = self.score_all(&terms, &rule);

        let scored: Vec<(usize, u32)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0)
            .collect();
        let ranked = top_n(scored, self.config.max_results, |(_, score)| *score);

        let results: Vec<ScoredEntry> = ranked
            .into_iter()
            .map(|(i, score)| ScoredEntry {
                entry: self.entries[i].clone(),
                score,
            })
            .collect();

        let elapsed = chrono::Utc::now() - start;
        debug!(
            "[perf] query='{}' filter={} terms={} entries={} results={} | total={}ms",
            query,
            filter.as_str(),
            terms.len(),
            self.entries.len(),
            results.len(),
            elapsed.num_milliseconds()
        );

        results
    }

    #[cfg(feature = "native")]
    fn score_all(&self, terms: &[String], rule: &FuzzyRule) -> Vec<u32> {
        self.lowered
            .par_iter()
            .map(|text| score_text(text, terms, rule))
            .collect()
    }

    #[cfg(not(feature = "native"))]
    fn score_all(&self, terms: &[String], rule: &FuzzyRule) -> Vec<u32> {
        self.lowered
            .iter()
            .map(|text| score_text(text, terms, rule))
            .collect()
    }

    /// What the search box does on input: rank, and remember the query.
    /// Returns `None` for queries below the minimum length, which leave the
    /// history untouched so the caller can show it instead.
    pub fn perform_search(&mut self, query: &str, filter: FilterType) -> Option<Vec<ScoredEntry>> {
        if !self.is_searchable(query) {
            return None;
        }
        let results = self.query(query, filter);
        self.add_to_history(query);
        Some(results)
    }

    /// Remember `query` and persist the history if it changed. A failed
    /// write is logged; the in-memory history is kept either way.
    pub fn add_to_history(&mut self, query: &str) {
        if self.history.add(query, self.config.max_history) {
            self.persist_history();
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    fn persist_history(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to save search history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzyMode;
    use crate::storage::MemoryStore;
    use crate::types::TextFragment;
    use std::rc::Rc;

    fn page(texts: &[(&str, &str)]) -> Vec<TextFragment> {
        texts
            .iter()
            .map(|(text, tag)| TextFragment::new(*text, *tag))
            .collect()
    }

    fn indexer(texts: &[(&str, &str)]) -> SearchIndexer<MemoryStore> {
        let mut search = SearchIndexer::new(MemoryStore::new(), SearchConfig::default());
        search.load();
        search.build(&page(texts), "/");
        search
    }

    #[test]
    fn test_react_developer_ranks_first() {
        let search = indexer(&[
            ("Node Backend", "h3"),
            ("React Developer", "h2"),
            ("CSS Styling", "li"),
        ]);
        let results = search.query("react", FilterType::All);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.text, "React Developer");
        assert!(results[0].score >= 15);
    }

    #[test]
    fn test_short_queries_yield_nothing() {
        let search = indexer(&[("A portfolio about art", "p")]);
        assert!(search.query("", FilterType::All).is_empty());
        assert!(search.query("a", FilterType::All).is_empty());
        assert!(search.query("   ", FilterType::All).is_empty());
    }

    #[test]
    fn test_query_is_deterministic() {
        let search = indexer(&[
            ("Rust services", "h2"),
            ("Rust CLI tools", "li"),
            ("Trusty old Perl", "li"),
            ("Go", "li"),
        ]);
        let first = search.query("rust", FilterType::All);
        let second = search.query("rust", FilterType::All);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let search = indexer(&[
            ("My rust notes", "p"),
            ("Rust", "h1"),
            ("More rust notes", "p"),
        ]);
        let results = search.query("rust", FilterType::All);
        let texts: Vec<&str> = results.iter().map(|r| r.entry.text.as_str()).collect();
        // "Rust": substring + prefix + fuzzy; the two notes tie at 10
        assert_eq!(texts, vec!["Rust", "My rust notes", "More rust notes"]);
        assert_eq!(results[0].score, 20);
        assert_eq!(results[1].score, 10);
    }

    #[test]
    fn test_results_capped() {
        let texts: Vec<(String, &str)> = (0..30).map(|i| (format!("item {}", i), "li")).collect();
        let borrowed: Vec<(&str, &str)> = texts.iter().map(|(t, tag)| (t.as_str(), *tag)).collect();
        let search = indexer(&borrowed);
        let results = search.query("item", FilterType::All);
        assert_eq!(results.len(), 20);
        assert_eq!(results[0].entry.text, "item 0");
    }

    #[test]
    fn test_filter_type_does_not_narrow_results() {
        let search = indexer(&[("Rust project", "h2"), ("Rust skill", "li")]);
        let all = search.query("rust", FilterType::All);
        for filter in [FilterType::Projects, FilterType::Skills, FilterType::Content] {
            assert_eq!(search.query("rust", filter), all);
        }
    }

    #[test]
    fn test_per_word_fuzzy_mode() {
        let config = SearchConfig {
            fuzzy_mode: FuzzyMode::PerWord,
            ..SearchConfig::default()
        };
        let mut search = SearchIndexer::new(MemoryStore::new(), config);
        search.build(&page(&[("Building with reakt today", "p")]), "/");

        let results = search.query("react", FilterType::All);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 5);
    }

    #[test]
    fn test_perform_search_records_history() {
        let store = Rc::new(MemoryStore::new());
        let mut search = SearchIndexer::new(Rc::clone(&store), SearchConfig::default());
        search.build(&page(&[("Rust services", "h2")]), "/");

        assert!(search.perform_search("r", FilterType::All).is_none());
        assert!(search.history().is_empty());

        let results = search.perform_search("rust", FilterType::All).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(store.raw("searchHistory").unwrap(), r#"["rust"]"#);
    }

    #[test]
    fn test_same_query_twice_is_stored_once() {
        let store = Rc::new(MemoryStore::new());
        let mut search = SearchIndexer::new(Rc::clone(&store), SearchConfig::default());
        search.add_to_history("rust");
        search.add_to_history("rust");

        assert_eq!(search.history().queries(), ["rust"]);
        let stored: Vec<String> =
            serde_json::from_str(&store.raw("searchHistory").unwrap()).unwrap();
        assert_eq!(stored, vec!["rust"]);
    }

    #[test]
    fn test_history_keeps_ten_most_recent() {
        let store = Rc::new(MemoryStore::new());
        let mut search = SearchIndexer::new(Rc::clone(&store), SearchConfig::default());
        for i in 0..11 {
            search.add_to_history(&format!("q{}", i));
        }

        let stored: Vec<String> =
            serde_json::from_str(&store.raw("searchHistory").unwrap()).unwrap();
        let expected: Vec<String> = (1..11).rev().map(|i| format!("q{}", i)).collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_history_reloaded_on_next_page() {
        let store = Rc::new(MemoryStore::new());
        {
            let mut search = SearchIndexer::new(Rc::clone(&store), SearchConfig::default());
            search.add_to_history("wasm");
        }
        let mut search = SearchIndexer::new(Rc::clone(&store), SearchConfig::default());
        search.load();
        assert_eq!(search.history().queries(), ["wasm"]);
    }

    #[test]
    fn test_corrupt_history_is_replaced() {
        let store = MemoryStore::new().with_item("searchHistory", "{{oops");
        let mut search = SearchIndexer::new(store, SearchConfig::default());
        search.load();
        assert!(search.history().is_empty());

        search.add_to_history("rust");
        assert_eq!(search.history().queries(), ["rust"]);
    }

    #[test]
    fn test_failed_write_keeps_memory_history() {
        let mut search = SearchIndexer::new(MemoryStore::read_only(), SearchConfig::default());
        search.add_to_history("rust");
        assert_eq!(search.history().queries(), ["rust"]);
        assert!(search.flush().is_err());
    }

    #[test]
    fn test_clear_history() {
        let store = Rc::new(MemoryStore::new());
        let mut search = SearchIndexer::new(Rc::clone(&store), SearchConfig::default());
        search.add_to_history("rust");
        search.clear_history();
        assert!(search.history().is_empty());
        assert_eq!(store.raw("searchHistory").unwrap(), "[]");
    }
}

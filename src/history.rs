use serde::{Deserialize, Serialize};

/// Recent search queries, most recent first
///
/// Serializes as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    queries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `query` at the front unless it is already present (exact match).
    /// Returns whether the history changed.
    pub fn add(&mut self, query: &str, cap: usize) -> bool {
        if self.queries.iter().any(|q| q == query) {
            return false;
        }
        self.queries.insert(0, query.to_string());
        self.queries.truncate(cap);
        true
    }

    /// Trim a history loaded from storage down to `cap`.
    pub fn enforce_cap(&mut self, cap: usize) {
        self.queries.truncate(cap);
    }

    pub fn clear(&mut self) {
        self.queries.clear();
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

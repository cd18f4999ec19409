//! HTML for the search surface's result pane.

use crate::history::SearchHistory;
use crate::parse::{escape_html, highlight_match};
use crate::types::ScoredEntry;

/// Result list for `query`, or the "no results" message
pub fn render_results(results: &[ScoredEntry], query: &str) -> String {
    if results.is_empty() {
        return format!(
            r#"<div class="no-results"><span class="no-results-icon">🔍</span><p>No results found for "{}"</p><small>Try different keywords or check your spelling</small></div>"#,
            escape_html(query)
        );
    }

    let items: String = results
        .iter()
        .map(|result| {
            format!(
                r#"<div class="search-result-item" data-id="{}"><div class="result-type">{}</div><div class="result-text">{}</div><div class="result-score">Score: {}</div></div>"#,
                result.entry.id,
                escape_html(&result.entry.element_type),
                highlight_match(&result.entry.text, query),
                result.score
            )
        })
        .collect();

    format!(
        r#"<div class="results-header"><span>Found {} results</span></div><div class="results-list">{}</div>"#,
        results.len(),
        items
    )
}

/// Recent searches, or the empty prompt when there are none
pub fn render_history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return r#"<div class="search-empty"><span class="empty-icon">🔍</span><p>Start typing to search...</p><small>Search across all content, projects, and skills</small></div>"#.to_string();
    }

    let items: String = history
        .queries()
        .iter()
        .map(|query| {
            let query = escape_html(query);
            format!(
                r#"<div class="history-item" data-query="{0}"><span class="history-icon">🕐</span><span class="history-query">{0}</span></div>"#,
                query
            )
        })
        .collect();

    format!(
        r#"<div class="search-history"><div class="history-header"><span>Recent Searches</span><button id="clear-history">Clear</button></div><div class="history-list">{}</div></div>"#,
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndexEntry;

    fn scored(id: u32, text: &str, score: u32) -> ScoredEntry {
        ScoredEntry {
            entry: IndexEntry {
                id,
                text: text.to_string(),
                element_type: "h2".to_string(),
                page_url: "/".to_string(),
                keywords: Vec::new(),
            },
            score,
        }
    }

    #[test]
    fn test_render_results() {
        let html = render_results(&[scored(4, "React Developer", 15)], "react");
        assert!(html.contains("Found 1 results"));
        assert!(html.contains(r#"data-id="4""#));
        assert!(html.contains("<mark>React</mark> Developer"));
        assert!(html.contains("Score: 15"));
    }

    #[test]
    fn test_render_no_results_escapes_query() {
        let html = render_results(&[], "<script>");
        assert!(html.contains("No results found for \"&lt;script&gt;\""));
    }

    #[test]
    fn test_render_history() {
        assert!(render_history(&SearchHistory::new()).contains("Start typing to search..."));

        let mut history = SearchHistory::new();
        history.add("rust", 10);
        history.add("a&b", 10);
        let html = render_history(&history);
        assert!(html.contains("Recent Searches"));
        assert!(html.find("a&amp;b").unwrap() < html.find("rust").unwrap());
    }
}

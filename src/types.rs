use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One element's worth of page text as seen by the indexer: (text, tag name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub text: String,
    pub tag: String,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        TextFragment {
            text: text.into(),
            tag: tag.into(),
        }
    }
}

/// Searchable text fragment, built once per page load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: u32,
    pub text: String,
    pub element_type: String,
    pub page_url: String,
    pub keywords: Vec<String>,
}

/// Index entry with its relevance score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredEntry {
    #[serde(flatten)]
    pub entry: IndexEntry,
    pub score: u32,
}

/// Result category picked in the search surface.
///
/// Carried through to the query but does not restrict scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    All,
    Projects,
    Skills,
    Content,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::All => "all",
            FilterType::Projects => "projects",
            FilterType::Skills => "skills",
            FilterType::Content => "content",
        }
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(FilterType::All),
            "projects" => Ok(FilterType::Projects),
            "skills" => Ok(FilterType::Skills),
            "content" => Ok(FilterType::Content),
            other => Err(format!("unknown filter type '{}'", other)),
        }
    }
}

/// String-keyed map that serializes as a JSON object in insertion order.
/// Re-inserting an existing key keeps its position.
pub type OrderedMap<V> = IndexMap<String, V>;

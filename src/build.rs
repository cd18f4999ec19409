use crate::parse::extract_keywords;
use crate::types::{IndexEntry, TextFragment};

/// Supplies the visible text of a rendered page, one fragment per element
///
/// The browser implementation walks the DOM; tests hand in fixed fragments.
pub trait TextSource {
    fn fragments(&self) -> Vec<TextFragment>;
}

impl TextSource for [TextFragment] {
    fn fragments(&self) -> Vec<TextFragment> {
        self.to_vec()
    }
}

impl TextSource for Vec<TextFragment> {
    fn fragments(&self) -> Vec<TextFragment> {
        self.clone()
    }
}

/// Limits applied while building the index
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Trimmed text must be longer than this
    pub min_text_length: usize,
    /// Keywords must be longer than this
    pub min_keyword_length: usize,
}

/// Build index entries from page text
///
/// Ids follow the source's fragment order, including skipped fragments, so an
/// id always points back at the element that produced it. Repeated text is
/// not deduplicated.
pub fn build_index<T: TextSource + ?Sized>(
    source: &T,
    page_url: &str,
    options: BuildOptions,
) -> Vec<IndexEntry> {
    source
        .fragments()
        .into_iter()
        .enumerate()
        .filter_map(|(position, fragment)| {
            let text = fragment.text.trim();
            if text.chars().count() <= options.min_text_length {
                return None;
            }
            Some(IndexEntry {
                id: position as u32,
                text: text.to_string(),
                element_type: fragment.tag.to_lowercase(),
                page_url: page_url.to_string(),
                keywords: extract_keywords(text, options.min_keyword_length),
            })
        })
        .collect()
}

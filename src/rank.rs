use crate::config::FuzzyMode;

/// Score weights
const SUBSTRING_SCORE: u32 = 10;
const PREFIX_SCORE: u32 = 5;
const FUZZY_SCORE: u32 = 5;

/// Edit distance with unit costs, over UTF-16 code units
///
/// Callers lower-case both sides first. Uses two rolling rows.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<u16> = a.encode_utf16().collect();
    let b: Vec<u16> = b.encode_utf16().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Whether `levenshtein(a, b) < threshold`, skipping the table when the
/// length difference alone already rules it out
pub fn within_distance(a: &str, b: &str, threshold: usize) -> bool {
    let len_a = a.encode_utf16().count();
    let len_b = b.encode_utf16().count();
    if len_a.abs_diff(len_b) >= threshold {
        return false;
    }
    levenshtein(a, b) < threshold
}

/// Fuzzy bonus settings
#[derive(Debug, Clone, Copy)]
pub struct FuzzyRule {
    pub mode: FuzzyMode,
    pub threshold: usize,
}

impl FuzzyRule {
    fn matches(&self, term: &str, text: &str) -> bool {
        match self.mode {
            FuzzyMode::WholeText => within_distance(term, text, self.threshold),
            FuzzyMode::PerWord => text
                .split_whitespace()
                .any(|word| within_distance(term, word, self.threshold)),
        }
    }
}

/// Score one lower-cased entry text against lower-cased query terms
///
/// Per term: +10 for a substring hit, +5 more if the text starts with the
/// term, and independently +5 for the fuzzy rule.
pub fn score_text(text: &str, terms: &[String], fuzzy: &FuzzyRule) -> u32 {
    terms
        .iter()
        .map(|term| {
            let mut score = 0;
            if text.contains(term.as_str()) {
                score += SUBSTRING_SCORE;
                if text.starts_with(term.as_str()) {
                    score += PREFIX_SCORE;
                }
            }
            if fuzzy.matches(term, text) {
                score += FUZZY_SCORE;
            }
            score
        })
        .sum()
}

/// Get the N highest-scoring items, ties kept in their original order
pub fn top_n<T, K: Ord>(mut items: Vec<T>, n: usize, score: impl Fn(&T) -> K) -> Vec<T> {
    // sort_by is stable
    items.sort_by(|a, b| score(b).cmp(&score(a)));
    items.truncate(n);
    items
}

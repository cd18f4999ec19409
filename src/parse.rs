/// Split a query into lower-cased search terms on whitespace
pub fn split_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

/// Extract keywords from element text for the index
/// Lowercases, strips everything but ASCII word chars and whitespace,
/// keeps words longer than `min_len`
pub fn extract_keywords(text: &str, min_len: usize) -> Vec<String> {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    stripped
        .split_whitespace()
        .filter(|word| word.chars().count() > min_len)
        .map(|word| word.to_string())
        .collect()
}

/// Escape text for inclusion in HTML markup
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Byte length of the prefix of `hay` that equals `needle` ignoring case
fn match_len_ignore_case(hay: &str, needle: &str) -> Option<usize> {
    let mut hay_chars = hay.char_indices();
    let mut end = 0;
    for n in needle.chars() {
        let (i, h) = hay_chars.next()?;
        if !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
        end = i + h.len_utf8();
    }
    Some(end)
}

/// Wrap every case-insensitive occurrence of `query` in `<mark>` tags.
/// Output is HTML-escaped; the query is matched literally.
pub fn highlight_match(text: &str, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return escape_html(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut plain_start = 0;
    let mut i = 0;

    while i < text.len() {
        match match_len_ignore_case(&text[i..], query) {
            Some(len) if len > 0 => {
                out.push_str(&escape_html(&text[plain_start..i]));
                out.push_str("<mark>");
                out.push_str(&escape_html(&text[i..i + len]));
                out.push_str("</mark>");
                i += len;
                plain_start = i;
            }
            _ => {
                i += text[i..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    out.push_str(&escape_html(&text[plain_start..]));
    out
}

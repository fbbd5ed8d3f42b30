//! Character-aware text helpers.
//!
//! Windows and limits are counted in characters, not bytes, so slicing
//! never lands inside a multi-byte code point.

/// Number of characters in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Split `s` into consecutive windows of `size` characters, without
/// overlap. The last window may be shorter. Empty input yields no windows.
pub fn chunk_chars(s: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        let head = truncate_chars(rest, size);
        chunks.push(head);
        rest = &rest[head.len()..];
    }
    chunks
}

/// The first `n` lines of `s`.
pub fn head_lines(s: &str, n: usize) -> impl Iterator<Item = &str> {
    s.lines().take(n)
}

/// Upper-case the first character and lower-case the rest.
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

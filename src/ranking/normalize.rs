/// Canonical form of a raw word: trimmed, lowercased, letters `a`-`z` only.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

/// A playable word is a non-empty run of lowercase ASCII letters.
pub fn is_valid(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_lowercase())
}

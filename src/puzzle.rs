use crate::error::{LexirankError, Result};
use crate::ranking::WordRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// Letters and words for one level's letter-tile puzzle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuzzleView {
    pub level: u8,
    pub letters: Vec<char>,
    pub words: Vec<WordRecord>,
}

/// Sorted, deduplicated uppercase letters needed to spell every word
pub fn unique_letters<'a, I>(words: I) -> Vec<char>
where
    I: IntoIterator<Item = &'a str>,
{
    words
        .into_iter()
        .flat_map(str::chars)
        .map(|c| c.to_ascii_uppercase())
        .collect::<BTreeSet<char>>()
        .into_iter()
        .collect()
}

/// Build the puzzle for `level` from already-fetched rows. An empty slice
/// means the level has no content.
pub fn assemble(level: u8, words: Vec<WordRecord>) -> Result<PuzzleView> {
    if words.is_empty() {
        return Err(LexirankError::not_found(format!("no words for level {level}")));
    }
    let letters = unique_letters(words.iter().map(WordRecord::word));
    Ok(PuzzleView {
        level,
        letters,
        words,
    })
}

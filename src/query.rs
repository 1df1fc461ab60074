use crate::error::{LexirankError, Result};
use crate::puzzle::{self, PuzzleView};
use crate::ranking::{LevelCount, WordRecord};
use crate::store::{WordQuery, WordStore};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;

pub const LEVEL_RANGE: RangeInclusive<i64> = 1..=50;
pub const LIMIT_RANGE: RangeInclusive<i64> = 1..=500;
pub const MIN_LEN_RANGE: RangeInclusive<i64> = 3..=12;
pub const MAX_LEN_RANGE: RangeInclusive<i64> = 3..=20;

/// Words fetched to build one puzzle
pub const PUZZLE_WORD_LIMIT: u32 = 100;

/// Filters for [`QueryService::list_words`]. Values are kept wide so that
/// out-of-range input reaches validation instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WordsParams {
    pub level: i64,
    pub limit: i64,
    pub min_len: i64,
    pub max_len: i64,
}

impl Default for WordsParams {
    fn default() -> Self {
        Self {
            level: 1,
            limit: 50,
            min_len: 3,
            max_len: 9,
        }
    }
}

impl WordsParams {
    /// Reject out-of-range values before anything touches storage
    pub fn validate(&self) -> Result<WordQuery> {
        let level = check_range("level", self.level, &LEVEL_RANGE)?;
        let limit = check_range("limit", self.limit, &LIMIT_RANGE)?;
        let min_len = check_range("min_len", self.min_len, &MIN_LEN_RANGE)?;
        let max_len = check_range("max_len", self.max_len, &MAX_LEN_RANGE)?;

        Ok(WordQuery {
            level: level as u8,
            length: Some((min_len as u32, max_len as u32)),
            limit: limit as u32,
        })
    }
}

fn check_range(name: &str, value: i64, range: &RangeInclusive<i64>) -> Result<i64> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(LexirankError::validation(format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

pub fn validate_level(level: i64) -> Result<u8> {
    check_range("level", level, &LEVEL_RANGE).map(|l| l as u8)
}

/// Table statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub total_words: u64,
    pub words_by_level: Vec<LevelCount>,
}

/// Read-only queries over an injected [`WordStore`]
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn WordStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn WordStore>) -> Self {
        Self { store }
    }

    pub fn from_store<S: WordStore + 'static>(store: S) -> Self {
        Self::new(Arc::new(store))
    }

    /// Words of one level within the length bounds, easiest first
    pub fn list_words(&self, params: &WordsParams) -> Result<Vec<WordRecord>> {
        let query = params.validate()?;
        self.store.words(&query)
    }

    /// Unique letters plus up to [`PUZZLE_WORD_LIMIT`] words of a level
    pub fn build_puzzle(&self, level: i64) -> Result<PuzzleView> {
        let level = validate_level(level)?;
        let words = self.store.words(&WordQuery {
            level,
            length: None,
            limit: PUZZLE_WORD_LIMIT,
        })?;
        puzzle::assemble(level, words)
    }

    pub fn stats(&self) -> Result<StatsView> {
        Ok(StatsView {
            total_words: self.store.total_words()?,
            words_by_level: self.store.words_by_level()?,
        })
    }
}

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::ranking::{LevelCount, WordRecord};

/// Parameterized read over the ranked table: exact level, optional inclusive
/// length bounds, ordered by difficulty ascending then zipf descending, with
/// the word itself as the last tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordQuery {
    pub level: u8,
    pub length: Option<(u32, u32)>,
    pub limit: u32,
}

impl WordQuery {
    pub fn matches(&self, record: &WordRecord) -> bool {
        record.level() == self.level
            && self
                .length
                .map_or(true, |(min, max)| (min..=max).contains(&record.length()))
    }
}

/// Read-only access to the ranked word table
pub trait WordStore: Send + Sync {
    fn words(&self, query: &WordQuery) -> Result<Vec<WordRecord>>;

    fn total_words(&self) -> Result<u64>;

    /// Row count per level, ascending by level, levels without rows omitted
    fn words_by_level(&self) -> Result<Vec<LevelCount>>;
}

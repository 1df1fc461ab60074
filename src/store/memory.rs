use super::{WordQuery, WordStore};
use crate::error::Result;
use crate::ranking::{LevelCount, WordRecord};
use itertools::Itertools;

/// Ranked table held in memory; used for fixtures and for serving a CSV
/// artifact without SQLite.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<WordRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<WordRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }
}

impl FromIterator<WordRecord> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = WordRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl WordStore for MemoryStore {
    fn words(&self, query: &WordQuery) -> Result<Vec<WordRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| query.matches(record))
            .sorted_by(|a, b| a.cmp_by_difficulty(b).then_with(|| a.word().cmp(b.word())))
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    fn total_words(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    fn words_by_level(&self) -> Result<Vec<LevelCount>> {
        Ok(self
            .records
            .iter()
            .counts_by(WordRecord::level)
            .into_iter()
            .sorted()
            .map(|(level, count)| LevelCount {
                level,
                count: count as u64,
            })
            .collect())
    }
}

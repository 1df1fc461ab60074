use super::{assign_level, cefr::CefrLevel, is_easy, score};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked word. Every derived attribute is computed in [`WordRecord::new`],
/// so `length` and `level` can never drift from `word` and `difficulty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordRecord {
    word: String,
    zipf: Option<f64>,
    cefr: Option<CefrLevel>,
    is_easy: bool,
    length: u32,
    difficulty: f64,
    level: u8,
}

impl WordRecord {
    /// Derive a record from a canonical word, its zipf score and CEFR label
    pub fn new(word: impl Into<String>, zipf: Option<f64>, cefr: Option<CefrLevel>) -> Self {
        let word = word.into();
        let zipf = zipf.filter(|z| !z.is_nan());
        let length = word.chars().count() as u32;
        let difficulty = score(zipf, cefr.map(CefrLevel::tier), length);

        Self {
            is_easy: is_easy(cefr.is_some_and(CefrLevel::is_basic), zipf),
            level: assign_level(difficulty),
            word,
            zipf,
            cefr,
            length,
            difficulty,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn zipf(&self) -> Option<f64> {
        self.zipf
    }

    pub fn cefr(&self) -> Option<CefrLevel> {
        self.cefr
    }

    pub fn is_easy(&self) -> bool {
        self.is_easy
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Query ordering: difficulty ascending, then zipf descending with
    /// undefined zipf last.
    pub fn cmp_by_difficulty(&self, other: &Self) -> Ordering {
        self.difficulty
            .total_cmp(&other.difficulty)
            .then_with(|| cmp_zipf_desc(self.zipf, other.zipf))
    }

    /// Table ordering: level first, then [`WordRecord::cmp_by_difficulty`]
    pub fn cmp_by_rank(&self, other: &Self) -> Ordering {
        self.level
            .cmp(&other.level)
            .then_with(|| self.cmp_by_difficulty(other))
    }
}

fn cmp_zipf_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Row layout of the ranked CSV artifact and the `words` table.
///
/// Labels outside A1..C2 (e.g. `zz`) leave `cefr_norm` empty instead of
/// echoing the uppercased raw label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub word: String,
    pub zipf: Option<f64>,
    pub cefr_norm: Option<CefrLevel>,
    pub is_easy: bool,
    pub length: u32,
    pub difficulty: f64,
    pub level: u8,
}

impl From<&WordRecord> for RankedRow {
    fn from(record: &WordRecord) -> Self {
        Self {
            word: record.word.clone(),
            zipf: record.zipf,
            cefr_norm: record.cefr,
            is_easy: record.is_easy,
            length: record.length,
            difficulty: record.difficulty,
            level: record.level,
        }
    }
}

impl From<RankedRow> for WordRecord {
    fn from(row: RankedRow) -> Self {
        WordRecord::new(row.word, row.zipf, row.cefr_norm)
    }
}

/// Number of ranked words in one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCount {
    pub level: u8,
    pub count: u64,
}

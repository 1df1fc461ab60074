use crate::error::{LexirankError, Result};
use crate::ranking::normalize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Source of word commonness on the Zipf scale (log10 of occurrences per
/// billion words, roughly 0 to 8, higher is more common).
pub trait FrequencyOracle {
    /// Zipf score for a canonical word, `None` when the oracle has no answer
    fn zipf(&self, word: &str) -> Option<f64>;
}

impl FrequencyOracle for HashMap<String, f64> {
    fn zipf(&self, word: &str) -> Option<f64> {
        self.get(word).copied()
    }
}

/// Zipf scores loaded from a CSV word list
#[derive(Debug, Clone, Default)]
pub struct ZipfTable {
    scores: HashMap<String, f64>,
    unknown_word_zipf: Option<f64>,
}

impl ZipfTable {
    pub fn new(scores: HashMap<String, f64>) -> Self {
        Self {
            scores,
            unknown_word_zipf: None,
        }
    }

    /// Answer `zipf` for words missing from the table instead of `None`
    pub fn with_unknown_word_zipf(mut self, zipf: Option<f64>) -> Self {
        self.unknown_word_zipf = zipf;
        self
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Load a frequency CSV with a `word` column and either a `zipf` column
    /// or a raw `count` column.
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(LexirankError::input(
                format!("missing frequency list {display}; expected columns word,zipf or word,count"),
                Some(display),
            ));
        }
        let file = std::fs::File::open(path)
            .map_err(|e| LexirankError::io(e.to_string(), Some(display.clone())))?;
        let table = Self::from_reader(file).map_err(|e| match e {
            LexirankError::Input { message, .. } => LexirankError::input(message, Some(display.clone())),
            other => other,
        })?;
        info!(path = %path.display(), words = table.len(), "loaded frequency list");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let word_idx = column("word")
            .ok_or_else(|| LexirankError::input("frequency list has no 'word' column", None))?;
        let value = match (column("zipf"), column("count")) {
            (Some(idx), _) => FrequencyColumn::Zipf(idx),
            (None, Some(idx)) => FrequencyColumn::Count(idx),
            (None, None) => {
                return Err(LexirankError::input(
                    "frequency list needs a 'zipf' or 'count' column",
                    None,
                ))
            }
        };

        let mut values: HashMap<String, f64> = HashMap::new();
        for (line, row) in rdr.records().enumerate() {
            let row = row?;
            let word = normalize(row.get(word_idx).unwrap_or_default());
            if word.is_empty() {
                continue;
            }
            let raw = row.get(value.index()).unwrap_or_default();
            let parsed: f64 = match raw.parse() {
                Ok(v) => v,
                Err(_) => {
                    debug!(line = line + 2, value = raw, "skipping unparsable frequency");
                    continue;
                }
            };
            match (values.entry(word), value) {
                (Entry::Vacant(slot), _) => {
                    slot.insert(parsed);
                }
                (Entry::Occupied(mut slot), FrequencyColumn::Count(_)) => {
                    *slot.get_mut() += parsed;
                }
                (Entry::Occupied(_), FrequencyColumn::Zipf(_)) => {}
            }
        }

        let scores = match value {
            FrequencyColumn::Zipf(_) => values,
            FrequencyColumn::Count(_) => counts_to_zipf(values),
        };
        Ok(Self::new(scores))
    }
}

impl FrequencyOracle for ZipfTable {
    fn zipf(&self, word: &str) -> Option<f64> {
        self.scores.get(word).copied().or(self.unknown_word_zipf)
    }
}

#[derive(Debug, Clone, Copy)]
enum FrequencyColumn {
    Zipf(usize),
    Count(usize),
}

impl FrequencyColumn {
    fn index(self) -> usize {
        match self {
            FrequencyColumn::Zipf(idx) | FrequencyColumn::Count(idx) => idx,
        }
    }
}

/// Convert raw corpus counts into Zipf scores, rounded to two decimals and
/// floored at zero.
pub fn counts_to_zipf(counts: HashMap<String, f64>) -> HashMap<String, f64> {
    let total: f64 = counts.values().filter(|c| **c > 0.0).sum();
    if total <= 0.0 {
        return counts.into_keys().map(|w| (w, 0.0)).collect();
    }
    counts
        .into_iter()
        .map(|(word, count)| {
            let zipf = if count > 0.0 {
                ((count / total * 1e9).log10() * 100.0).round() / 100.0
            } else {
                0.0
            };
            (word, zipf.max(0.0))
        })
        .collect()
}

use crate::error::{LexirankError, Result};
use crate::frequency::{FrequencyOracle, ZipfTable};
use crate::ranking::{is_valid, normalize, CefrLevel, RankedRow, WordRecord};
use crate::store::sqlite::SqliteStore;
use itertools::Itertools;
use std::fs;
use std::io::{BufWriter, Read};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Word lengths kept in the ranked table
pub const PLAYABLE_LENGTHS: RangeInclusive<u32> = 3..=9;

pub const RANKED_CSV: &str = "words_ranked.csv";
pub const WORDS_DB: &str = "words.db";

/// Column order of the ranked CSV and the `words` table
pub const RANKED_COLUMNS: [&str; 7] = [
    "word",
    "zipf",
    "cefr_norm",
    "is_easy",
    "length",
    "difficulty",
    "level",
];

/// One row of the batch input, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub word: String,
    pub cefr: String,
}

impl RawEntry {
    pub fn new(word: impl Into<String>, cefr: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            cefr: cefr.into(),
        }
    }
}

/// Read the `word,cefr` batch input. Both columns are required; any other
/// columns are ignored.
pub fn read_input(path: &Path) -> Result<Vec<RawEntry>> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(LexirankError::input(
            format!("missing {display}; create it with columns: word,cefr"),
            Some(display),
        ));
    }
    let file = fs::File::open(path).map_err(|e| LexirankError::io(e.to_string(), Some(display.clone())))?;
    read_input_from(file).map_err(|e| match e {
        LexirankError::Input { message, .. } => LexirankError::input(message, Some(display.clone())),
        other => other,
    })
}

pub fn read_input_from<R: Read>(reader: R) -> Result<Vec<RawEntry>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (word_idx, cefr_idx) = match (column("word"), column("cefr")) {
        (Some(w), Some(c)) => (w, c),
        _ => {
            return Err(LexirankError::input(
                "input must have columns: word, cefr",
                None,
            ))
        }
    };

    let mut entries = Vec::new();
    for row in rdr.records() {
        let row = row?;
        entries.push(RawEntry::new(
            row.get(word_idx).unwrap_or_default(),
            row.get(cefr_idx).unwrap_or_default(),
        ));
    }
    Ok(entries)
}

/// Row counts at each stage of a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildCounts {
    pub read: usize,
    pub valid: usize,
    pub unique: usize,
    pub ranked: usize,
}

/// Turns raw `(word, cefr)` pairs into the ranked word table
pub struct DatasetBuilder<'a, O: FrequencyOracle> {
    oracle: &'a O,
}

impl<'a, O: FrequencyOracle> DatasetBuilder<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    /// Normalize, dedup (first occurrence wins), score, filter to playable
    /// lengths and sort by level, difficulty and descending zipf.
    pub fn build(&self, entries: &[RawEntry]) -> (Vec<WordRecord>, BuildCounts) {
        let mut counts = BuildCounts {
            read: entries.len(),
            ..BuildCounts::default()
        };

        let normalized: Vec<(String, &str)> = entries
            .iter()
            .map(|entry| (normalize(&entry.word), entry.cefr.as_str()))
            .filter(|(word, _)| is_valid(word))
            .collect();
        counts.valid = normalized.len();

        let unique: Vec<(String, &str)> = normalized
            .into_iter()
            .unique_by(|(word, _)| word.clone())
            .collect();
        counts.unique = unique.len();

        let mut records: Vec<WordRecord> = unique
            .into_iter()
            .map(|(word, label)| {
                let zipf = self.oracle.zipf(&word);
                WordRecord::new(word, zipf, CefrLevel::parse_label(label))
            })
            .filter(|record| PLAYABLE_LENGTHS.contains(&record.length()))
            .collect();
        records.sort_by(WordRecord::cmp_by_rank);
        counts.ranked = records.len();

        (records, counts)
    }
}

/// Write the ranked CSV through a temp file in the target directory, so a
/// reader never sees a half-written artifact.
pub fn write_ranked_csv(path: &Path, records: &[WordRecord]) -> Result<()> {
    let display = path.display().to_string();
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir).map_err(|e| LexirankError::io(e.to_string(), Some(display.clone())))?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(temp_file.as_file()));
        // header goes out even for an empty table
        writer.write_record(RANKED_COLUMNS)?;
        for record in records {
            writer.serialize(RankedRow::from(record))?;
        }
        writer.flush()?;
    }
    temp_file
        .persist(path)
        .map_err(|e| LexirankError::io(e.to_string(), Some(display)))?;
    Ok(())
}

/// Read a ranked CSV artifact back into records
pub fn read_ranked_csv(path: &Path) -> Result<Vec<WordRecord>> {
    let display = path.display().to_string();
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|e| LexirankError::input(e.to_string(), Some(display.clone())))?;
    let mut records = Vec::new();
    for row in rdr.deserialize::<RankedRow>() {
        records.push(row.map_err(|e| LexirankError::input(e.to_string(), Some(display.clone())))?.into());
    }
    Ok(records)
}

/// Inputs of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub input_path: PathBuf,
    pub frequency_path: PathBuf,
    pub out_dir: PathBuf,
    pub unknown_word_zipf: Option<f64>,
}

impl From<&crate::config::Config> for BuildOptions {
    fn from(cfg: &crate::config::Config) -> Self {
        Self {
            input_path: cfg.input_path.clone(),
            frequency_path: cfg.frequency_path.clone(),
            out_dir: cfg.out_dir.clone(),
            unknown_word_zipf: cfg.unknown_word_zipf,
        }
    }
}

/// Outcome of the optional SQLite index
#[derive(Debug, Clone, PartialEq)]
pub enum IndexOutcome {
    Written(PathBuf),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub counts: BuildCounts,
    pub ranked_csv: PathBuf,
    pub index: IndexOutcome,
}

/// Run the whole batch. Input problems and a failed CSV write abort the run;
/// a failed SQLite write is reported in [`BuildReport::index`] instead.
pub fn run(options: &BuildOptions) -> Result<BuildReport> {
    let entries = read_input(&options.input_path)?;
    let oracle = ZipfTable::load(&options.frequency_path)?.with_unknown_word_zipf(options.unknown_word_zipf);

    let (records, counts) = DatasetBuilder::new(&oracle).build(&entries);
    info!(
        read = counts.read,
        valid = counts.valid,
        unique = counts.unique,
        ranked = counts.ranked,
        "ranked word table"
    );

    let ranked_csv = options.out_dir.join(RANKED_CSV);
    write_ranked_csv(&ranked_csv, &records)?;
    info!(path = %ranked_csv.display(), rows = records.len(), "wrote ranked csv");

    let db_path = options.out_dir.join(WORDS_DB);
    let index = match SqliteStore::replace_table(&db_path, &records) {
        Ok(()) => {
            info!(path = %db_path.display(), "wrote sqlite index");
            IndexOutcome::Written(db_path)
        }
        Err(e) => {
            warn!(path = %db_path.display(), error = %e, "sqlite index skipped");
            IndexOutcome::Skipped(e.to_string())
        }
    };

    Ok(BuildReport {
        counts,
        ranked_csv,
        index,
    })
}

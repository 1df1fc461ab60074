use super::{WordQuery, WordStore};
use crate::error::{LexirankError, Result};
use crate::ranking::{CefrLevel, LevelCount, RankedRow, WordRecord};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub type Pool = r2d2::Pool<SqliteConnectionManager>;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

fn check_words_table(path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    conn.prepare("SELECT 1 FROM words LIMIT 1")?;
    Ok(())
}

/// Read-only view over the `words` table in a SQLite file
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: Pool,
}

impl SqliteStore {
    /// Open an existing database for reading. The file must be a SQLite
    /// database that already holds the `words` table.
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(LexirankError::input(
                format!("missing database {display}; run `lexirank build` first"),
                Some(display),
            ));
        }

        check_words_table(path).map_err(|e| {
            LexirankError::input(
                format!("{display} is not a word database: {e}"),
                Some(display.clone()),
            )
        })?;

        let manager = SqliteConnectionManager::file(path).with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY);
        let pool = r2d2::Pool::builder()
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)?;
        debug!(path = %path.display(), "opened word database");
        Ok(Self { pool })
    }

    /// Replace the `words` table with `records` in one transaction, creating
    /// the database file if needed.
    pub fn replace_table(path: &Path, records: &[WordRecord]) -> Result<()> {
        let mut conn = Connection::open(path)?;
        let tx = conn.transaction()?;

        tx.execute("DROP TABLE IF EXISTS words", [])?;
        tx.execute(
            r#"
            CREATE TABLE words (
                word TEXT NOT NULL,
                zipf REAL,
                cefr_norm TEXT,
                is_easy BOOLEAN NOT NULL,
                length INTEGER NOT NULL,
                difficulty REAL NOT NULL,
                level INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO words
                (word, zipf, cefr_norm, is_easy, length, difficulty, level)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for record in records {
                let row = RankedRow::from(record);
                stmt.execute(params![
                    row.word,
                    row.zipf,
                    row.cefr_norm.map(|c| c.to_string()),
                    row.is_easy,
                    row.length,
                    row.difficulty,
                    row.level,
                ])?;
            }
        }

        tx.execute("CREATE INDEX IF NOT EXISTS idx_words_level ON words(level)", [])?;
        tx.execute("CREATE INDEX IF NOT EXISTS idx_words_word ON words(word)", [])?;

        tx.commit()?;
        Ok(())
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

impl WordStore for SqliteStore {
    fn words(&self, query: &WordQuery) -> Result<Vec<WordRecord>> {
        let conn = self.conn()?;
        let (min_len, max_len) = query.length.unwrap_or((0, u32::MAX));
        let mut stmt = conn.prepare(
            r#"
            SELECT word, zipf, cefr_norm
            FROM words
            WHERE level = ?1 AND length BETWEEN ?2 AND ?3
            ORDER BY difficulty ASC, zipf DESC, word ASC
            LIMIT ?4
            "#,
        )?;

        let rows = stmt.query_map(params![query.level, min_len, max_len, query.limit], |row| {
            let word: String = row.get(0)?;
            let zipf: Option<f64> = row.get(1)?;
            let cefr: Option<String> = row.get(2)?;
            Ok(WordRecord::new(
                word,
                zipf,
                cefr.as_deref().and_then(CefrLevel::parse_label),
            ))
        })?;

        let mut words = Vec::new();
        for word in rows {
            words.push(word?);
        }
        Ok(words)
    }

    fn total_words(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn words_by_level(&self) -> Result<Vec<LevelCount>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT level, COUNT(*) as count
            FROM words
            GROUP BY level
            ORDER BY level
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok(LevelCount {
                level: row.get(0)?,
                count: count as u64,
            })
        })?;

        let mut levels = Vec::new();
        for level in rows {
            levels.push(level?);
        }
        Ok(levels)
    }
}

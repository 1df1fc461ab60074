use crate::app_dirs::AppDirs;
use crate::builder::{RANKED_CSV, WORDS_DB};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub input_path: PathBuf,
    pub frequency_path: PathBuf,
    pub out_dir: PathBuf,
    /// Zipf answered for words missing from the frequency list; `null`
    /// leaves their frequency undefined
    pub unknown_word_zipf: Option<f64>,
    pub bind_address: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/cefr.csv"),
            frequency_path: PathBuf::from("data/frequency.csv"),
            out_dir: PathBuf::from("out"),
            unknown_word_zipf: Some(0.0),
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "https://*.vercel.app".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.out_dir.join(WORDS_DB)
    }

    pub fn ranked_csv_path(&self) -> PathBuf {
        self.out_dir.join(RANKED_CSV)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path().unwrap_or_else(|| PathBuf::from("lexirank_config.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

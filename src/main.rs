use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexirank::{
    builder::{self, BuildOptions, IndexOutcome},
    config::{Config, ConfigStore, FileConfigStore},
    query::QueryService,
    server::{self, ServerSettings},
    store::{MemoryStore, SqliteStore},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// difficulty-ranked word lists and letter puzzles for word games
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Ranks a CEFR-labelled word list by difficulty, buckets it into 50 game levels, and serves levels and letter puzzles over a small read-only HTTP API."
)]
pub struct Cli {
    /// json config file (defaults to the platform config dir, or $LEXIRANK_CONFIG)
    #[clap(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// rank the input list and write words_ranked.csv and words.db
    Build {
        /// csv with columns word,cefr
        #[clap(short = 'i', long)]
        input: Option<PathBuf>,

        /// csv with columns word,zipf or word,count
        #[clap(short = 'f', long)]
        frequency: Option<PathBuf>,

        /// directory for the ranked outputs
        #[clap(short = 'o', long)]
        out_dir: Option<PathBuf>,

        /// zipf used for words missing from the frequency list
        #[clap(long, allow_hyphen_values = true)]
        unknown_zipf: Option<f64>,

        /// leave the frequency of unknown words undefined
        #[clap(long, conflicts_with = "unknown_zipf")]
        no_unknown_zipf: bool,
    },

    /// serve the ranked table over http
    Serve {
        /// sqlite database written by `build`
        #[clap(long)]
        db: Option<PathBuf>,

        /// serve a ranked csv from memory instead of sqlite; without a value
        /// the csv in the configured out dir is used
        #[clap(long, conflicts_with = "db")]
        csv: Option<Option<PathBuf>>,

        /// address to bind
        #[clap(short = 'b', long)]
        bind: Option<String>,

        /// port to listen on
        #[clap(short = 'p', long)]
        port: Option<u16>,
    },

    /// print the puzzle for one level as json
    Puzzle {
        /// level between 1 and 50
        #[clap(allow_hyphen_values = true)]
        level: i64,

        /// sqlite database written by `build`
        #[clap(long)]
        db: Option<PathBuf>,
    },
}

impl Cli {
    fn load_config(&self) -> Config {
        let store = match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        store.load()
    }
}

/// Fold `build` flags over the loaded config
fn build_options(cfg: &Config, command: &Command) -> BuildOptions {
    let mut options = BuildOptions::from(cfg);
    if let Command::Build {
        input,
        frequency,
        out_dir,
        unknown_zipf,
        no_unknown_zipf,
    } = command
    {
        if let Some(input) = input {
            options.input_path = input.clone();
        }
        if let Some(frequency) = frequency {
            options.frequency_path = frequency.clone();
        }
        if let Some(out_dir) = out_dir {
            options.out_dir = out_dir.clone();
        }
        if unknown_zipf.is_some() {
            options.unknown_word_zipf = *unknown_zipf;
        }
        if *no_unknown_zipf {
            options.unknown_word_zipf = None;
        }
    }
    options
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_build(cfg: &Config, command: &Command) -> Result<()> {
    let options = build_options(cfg, command);
    let report = builder::run(&options).context("batch build failed")?;

    println!(
        "Wrote {} ({} rows)",
        report.ranked_csv.display(),
        report.counts.ranked
    );
    match report.index {
        IndexOutcome::Written(path) => println!("Wrote {}", path.display()),
        IndexOutcome::Skipped(reason) => println!("SQLite skipped: {reason}"),
    }
    Ok(())
}

fn run_serve(
    cfg: &Config,
    db: Option<PathBuf>,
    csv: Option<Option<PathBuf>>,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let service = match csv {
        Some(path) => {
            let path = path.unwrap_or_else(|| cfg.ranked_csv_path());
            let records = builder::read_ranked_csv(&path)
                .with_context(|| format!("cannot load {}", path.display()))?;
            let store = MemoryStore::new(records);
            info!(
                path = %path.display(),
                rows = store.records().len(),
                "serving ranked csv from memory"
            );
            QueryService::from_store(store)
        }
        None => {
            let path = db.unwrap_or_else(|| cfg.db_path());
            QueryService::from_store(SqliteStore::open(&path)?)
        }
    };

    let mut settings = ServerSettings::from(cfg);
    if let Some(bind) = bind {
        settings.bind_address = bind;
    }
    if let Some(port) = port {
        settings.port = port;
    }

    actix_web::rt::System::new()
        .block_on(server::serve(service, settings))
        .context("http server stopped")
}

fn run_puzzle(cfg: &Config, level: i64, db: Option<PathBuf>) -> Result<()> {
    let path = db.unwrap_or_else(|| cfg.db_path());
    let service = QueryService::from_store(SqliteStore::open(&path)?);
    let puzzle = service.build_puzzle(level)?;
    println!("{}", serde_json::to_string_pretty(&puzzle)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let cfg = cli.load_config();

    match cli.command.clone() {
        command @ Command::Build { .. } => run_build(&cfg, &command),
        Command::Serve { db, csv, bind, port } => run_serve(&cfg, db, csv, bind, port),
        Command::Puzzle { level, db } => run_puzzle(&cfg, level, db),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_cli_build_defaults() {
        let cli = Cli::parse_from(["lexirank", "build"]);
        assert_eq!(
            cli.command,
            Command::Build {
                input: None,
                frequency: None,
                out_dir: None,
                unknown_zipf: None,
                no_unknown_zipf: false,
            }
        );
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_build_flags_override_config() {
        let cli = Cli::parse_from([
            "lexirank",
            "build",
            "-i",
            "words.csv",
            "--out-dir",
            "dist",
            "--unknown-zipf",
            "1.5",
        ]);
        let options = build_options(&Config::default(), &cli.command);
        assert_eq!(options.input_path, PathBuf::from("words.csv"));
        assert_eq!(options.frequency_path, PathBuf::from("data/frequency.csv"));
        assert_eq!(options.out_dir, PathBuf::from("dist"));
        assert_eq!(options.unknown_word_zipf, Some(1.5));
    }

    #[test]
    fn test_no_unknown_zipf() {
        let cli = Cli::parse_from(["lexirank", "build", "--no-unknown-zipf"]);
        let options = build_options(&Config::default(), &cli.command);
        assert_eq!(options.unknown_word_zipf, None);
    }

    #[test]
    fn test_unknown_zipf_conflicts() {
        let result = Cli::try_parse_from([
            "lexirank",
            "build",
            "--unknown-zipf",
            "0",
            "--no-unknown-zipf",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_serve_and_global_config() {
        let cli = Cli::parse_from(["lexirank", "serve", "-p", "9000", "--config", "cfg.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(
            cli.command,
            Command::Serve {
                db: None,
                csv: None,
                bind: None,
                port: Some(9000),
            }
        );
    }

    #[test]
    fn test_cli_serve_csv_value_is_optional() {
        let cli = Cli::parse_from(["lexirank", "serve", "--csv"]);
        assert_matches!(cli.command, Command::Serve { csv: Some(None), .. });

        let cli = Cli::parse_from(["lexirank", "serve", "--csv", "ranked.csv"]);
        assert_matches!(
            cli.command,
            Command::Serve { csv: Some(Some(ref p)), .. } if p == &PathBuf::from("ranked.csv")
        );
    }

    #[test]
    fn test_cli_serve_db_conflicts_with_csv() {
        let result = Cli::try_parse_from(["lexirank", "serve", "--db", "a.db", "--csv", "a.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_puzzle_accepts_any_integer() {
        let cli = Cli::parse_from(["lexirank", "puzzle", "-3"]);
        assert_eq!(cli.command, Command::Puzzle { level: -3, db: None });
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["lexirank"]).is_err());
    }
}

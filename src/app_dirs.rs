use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `config.json` under the platform config dir, overridable with
    /// `LEXIRANK_CONFIG`
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("LEXIRANK_CONFIG") {
            Some(PathBuf::from(path))
        } else {
            ProjectDirs::from("", "", "lexirank").map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
        }
    }
}

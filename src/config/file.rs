//! Discovery and loading of `ecsync.toml`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::toml_schema::EcsyncToml;

pub const CONFIG_FILENAME: &str = "ecsync.toml";

/// Error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Search upward from `start_dir` for a file with the given name.
///
/// If `stop_at_git_root` is true, stops searching when a `.git` directory is found.
pub fn find_file_upward(
    start_dir: &Path,
    filename: &str,
    stop_at_git_root: bool,
) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let file_path = dir.join(filename);
        if file_path.is_file() {
            return Some(file_path);
        }

        if stop_at_git_root && dir.join(".git").exists() {
            return None;
        }
    }
    None
}

/// Find `ecsync.toml` upward from `start_dir`, stopping at the git root.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    find_file_upward(start_dir, CONFIG_FILENAME, true)
}

pub fn load_config(path: &Path) -> Result<EcsyncToml, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: EcsyncToml = toml::from_str(&content)?;
    Ok(config)
}

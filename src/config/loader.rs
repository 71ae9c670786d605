//! Configuration loading from file system
//!
//! Looks for `.spellbook.{yaml,yml,json}` in each search directory, then reads
//! any explicitly named files, and merges everything into one [`Config`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::defaults::{CONFIG_EXTENSIONS, CONFIG_FILE_STEM};
use super::types::Config;
use crate::error::{Result, ResultExt, SpellbookError};

/// Home directory first, then the working directory
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut search_dirs = Vec::with_capacity(2);
    if let Some(home) = dirs::home_dir() {
        search_dirs.push(home);
    }
    search_dirs.push(PathBuf::from("."));
    search_dirs
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// First existing config file in `dir`, trying each extension in order
pub fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext)))
        .find(|path| path.is_file())
}

/// Read and parse one config file; the extension selects JSON or YAML
pub fn read_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(|e| SpellbookError::Config {
        path: path.to_path_buf(),
        message: "cannot read file".to_string(),
        source: Some(Box::new(e)),
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str::<Config>(&contents)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    } else if contents.trim().is_empty() {
        Ok(Config::default())
    } else {
        serde_yaml::from_str::<Config>(&contents)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    };

    parsed.map_err(|e| SpellbookError::Config {
        path: path.to_path_buf(),
        message: format!("cannot parse config: {}", e),
        source: Some(e),
    })
}

/// Load and merge config files.
///
/// Each directory in `dirs` contributes at most one file; `extra_files` are
/// read after them and must exist. A file reached twice (e.g. when the working
/// directory is the home directory) is read once. Fails with
/// [`SpellbookError::NoConfigs`] when nothing was found.
#[instrument(name = "load_config", skip_all, fields(dirs = dirs.len(), extra = extra_files.len()))]
pub fn load_config(dirs: &[PathBuf], extra_files: &[PathBuf]) -> Result<Config> {
    let mut paths: Vec<PathBuf> = dirs
        .iter()
        .filter_map(|dir| find_config_in_dir(dir))
        .collect();
    paths.extend(extra_files.iter().cloned());

    if paths.is_empty() {
        return Err(SpellbookError::NoConfigs {
            searched: dirs.to_vec(),
        });
    }

    let mut seen: Vec<PathBuf> = Vec::with_capacity(paths.len());
    let mut config = Config::default();
    for path in paths {
        let key = fs::canonicalize(&path).warn_on_err().unwrap_or_else(|| path.clone());
        if seen.contains(&key) {
            debug!(path = %path.display(), "Config file already loaded, skipping");
            continue;
        }
        seen.push(key);

        let file_config = read_config_file(&path)?;
        info!(
            path = %path.display(),
            commands = file_config.commands.len(),
            "Loaded config file"
        );
        config.merge(file_config);
    }

    Ok(config)
}

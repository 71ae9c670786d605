//! Configuration module - Command library and user preferences
//!
//! This module provides functionality for:
//! - Loading `.spellbook.yaml` / `.spellbook.json` from the home and working directories
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, Command, SearchField)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_PLACEHOLDER, DEFAULT_PROMPT};

pub use types::{Command, Config, SearchField};

pub use loader::{default_search_dirs, expand_path, load_config, read_config_file};

#[cfg(test)]
pub use loader::find_config_in_dir;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Prompt shown in front of the input line
pub const DEFAULT_PROMPT: &str = "> ";

/// Placeholder shown while the input line is empty
pub const DEFAULT_PLACEHOLDER: &str = "type command";

/// Base name of a config file, looked up in each search directory
pub const CONFIG_FILE_STEM: &str = ".spellbook";

/// Extensions tried for each search directory, in order
pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

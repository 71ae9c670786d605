use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

use crate::template::TemplateError;

/// Domain-specific errors for spellbook
#[derive(Error, Debug)]
pub enum SpellbookError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{}: {message}", path.display())]
    Config {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("no config files found (searched: {})", display_paths(searched))]
    NoConfigs { searched: Vec<PathBuf> },

    #[error("cannot split command: {0}")]
    CommandSplit(String),

    #[error("failed to start '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl SpellbookError {
    /// Short message suitable for the status line or stderr
    pub fn user_message(&self) -> String {
        match self {
            Self::Template(e) => e.to_string(),
            Self::Config { path, message, .. } => {
                format!("Config issue in {}: {}", path.display(), message)
            }
            Self::NoConfigs { .. } => {
                "No command library found. Create ~/.spellbook.yaml with a `commands:` list."
                    .to_string()
            }
            Self::CommandSplit(msg) => format!("Could not split command: {}", msg),
            Self::ProcessSpawn { program, source } => {
                format!("Could not start {}: {}", program, source)
            }
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, SpellbookError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// ```ignore
/// use spellbook::error::ResultExt;
///
/// let cwd = std::env::current_dir().warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_converts() {
        let err: SpellbookError = TemplateError::InvalidVariableName {
            var_name: "x y".to_string(),
            template: "echo %(x y)".to_string(),
        }
        .into();
        assert!(matches!(err, SpellbookError::Template(_)));
        assert!(err.user_message().contains("'x y'"));
    }

    #[test]
    fn test_no_configs_lists_searched_paths() {
        let err = SpellbookError::NoConfigs {
            searched: vec![PathBuf::from("/home/a"), PathBuf::from(".")],
        };
        assert_eq!(
            err.to_string(),
            "no config files found (searched: /home/a, .)"
        );
    }

    #[test]
    fn test_config_error_display_names_file() {
        let err = SpellbookError::Config {
            path: PathBuf::from("/tmp/.spellbook.yaml"),
            message: "cannot unmarshal".to_string(),
            source: None,
        };
        assert_eq!(err.to_string(), "/tmp/.spellbook.yaml: cannot unmarshal");
    }

    #[test]
    fn test_log_err_returns_none_on_error() {
        let result: std::result::Result<u32, &str> = Err("boom");
        assert_eq!(result.log_err(), None);
        let ok: std::result::Result<u32, &str> = Ok(3);
        assert_eq!(ok.warn_on_err(), Some(3));
    }
}

//! Structured JSONL logging to a file, with optional human-readable stderr output.
//!
//! - **JSONL to file** (~/.spellbook/logs/spellbook.jsonl) - one event per line
//! - **Compact to stderr** - only when asked for; the terminal UI owns the screen otherwise
//!
//! Info-level events name templates and programs. Filled-in command lines hold
//! whatever the user typed and are only logged at debug.
//!
//! # Usage
//!
//! ```rust,ignore
//! use spellbook::logging::{self, LogOptions};
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init(LogOptions { stderr: false });
//!
//! // Use tracing macros directly
//! tracing::info!(event_type = "app_lifecycle", "Started");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2024-12-25T10:30:45.123Z","level":"INFO","target":"spellbook::executor","fields":{"event_type":"command_event","program":"git","exit_code":0,"duration_ms":42,"message":"Command finished"}}
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "spellbook.jsonl";

/// Env var consulted before `RUST_LOG`
pub const LOG_ENV_VAR: &str = "SPELLBOOK_LOG";

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Also write compact logs to stderr
    pub stderr: bool,
}

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize logging.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// When the log file cannot be opened only the stderr layer (if enabled) is
/// installed.
pub fn init(options: LogOptions) -> LoggingGuard {
    let log_path = log_path();

    let (json_layer, file_guard) = match open_log_file(&log_path) {
        Some(file) => {
            // Non-blocking so a slow disk never stalls key handling
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = options.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .compact()
    });

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("[LOGGING] Failed to install subscriber: {}", e);
    }

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        stderr = options.stderr,
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// `SPELLBOOK_LOG`, then `RUST_LOG`, then `info`
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("[LOGGING] Failed to create log directory: {}", e);
            return None;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eprintln!("[LOGGING] Failed to open log file: {}", e))
        .ok()
}

/// Get the log directory path (~/.spellbook/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".spellbook").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("spellbook-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// TYPED EVENTS
// =============================================================================

/// A command finished running
pub fn log_command_event(program: &str, exit_code: i32, duration_ms: u64) {
    if exit_code == 0 {
        tracing::info!(
            event_type = "command_event",
            program = program,
            exit_code = exit_code,
            duration_ms = duration_ms,
            "Command finished"
        );
    } else {
        tracing::warn!(
            event_type = "command_event",
            program = program,
            exit_code = exit_code,
            duration_ms = duration_ms,
            "Command exited with non-zero status"
        );
    }
}

/// A completion session changed state (entered, cancelled, finished)
pub fn log_completion_event(action: &str, template: &str, details: Option<&str>) {
    match details {
        Some(details) => tracing::info!(
            event_type = "completion_event",
            action = action,
            template = template,
            details = details,
            "Completion {}", action
        ),
        None => tracing::info!(
            event_type = "completion_event",
            action = action,
            template = template,
            "Completion {}", action
        ),
    }
}

/// Config sources were loaded
pub fn log_config_event(commands: usize, search_field: &str) {
    tracing::info!(
        event_type = "config_event",
        commands = commands,
        search_field = search_field,
        "Config loaded"
    );
}

/// In-memory sink for tests that check what reaches the log
#[cfg(test)]
pub(crate) mod capture {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` under a JSON subscriber capped at `level` and return what it logged
    pub(crate) fn with_logs<T>(level: tracing::Level, f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .with_writer(logs.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs.contents())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_location() {
        let path = log_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("spellbook.jsonl"));
        assert!(path.parent().is_some_and(|p| p.ends_with("logs")));
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.jsonl");
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_event_helpers_without_subscriber() {
        // Events are dropped silently when no subscriber is installed
        log_command_event("true", 0, 1);
        log_command_event("false", 1, 1);
        log_completion_event("enter", "git log %(branch)", None);
        log_completion_event("error", "bad %(1)", Some("invalid name"));
        log_config_event(3, "command");
    }

    #[test]
    fn test_command_event_names_program_only() {
        let ((), logs) = capture::with_logs(tracing::Level::INFO, || {
            log_command_event("git", 0, 12);
            log_command_event("make", 2, 40);
        });
        let lines: Vec<&str> = logs.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""level":"INFO""#));
        assert!(lines[0].contains(r#""program":"git""#));
        assert!(lines[1].contains(r#""level":"WARN""#));
        assert!(lines[1].contains(r#""exit_code":2"#));
    }
}

//! Running a finished command
//!
//! The expanded command goes through env/tilde resolution, is split into argv
//! with POSIX shell quoting rules, and runs as a child process that inherits
//! the terminal. There is no shell in between: pipes and redirections are
//! passed through as plain arguments.

use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;

use tracing::{debug, error, instrument};

use crate::error::{Result, SpellbookError};
use crate::logging;

/// Expand `$VAR`, `${VAR}` and a leading `~`.
///
/// References to unset variables are left as written, so `awk '{print $1}'`
/// and other shell-level `$` syntax survive.
pub fn resolve_env(raw: &str) -> String {
    let mut unresolved = Vec::new();
    let tilded = shellexpand::tilde(raw);
    let expanded = shellexpand::env_with_context_no_errors(&*tilded, |var: &str| {
        let value = std::env::var(var).ok();
        if value.is_none() {
            unresolved.push(var.to_string());
        }
        value
    })
    .into_owned();

    if !unresolved.is_empty() {
        debug!(vars = ?unresolved, "Left unset variables unexpanded");
    }
    expanded
}

/// Split a command line into argv
pub fn split(cmd: &str) -> Result<Vec<String>> {
    let argv = shlex::split(cmd)
        .ok_or_else(|| SpellbookError::CommandSplit("unbalanced quotes".to_string()))?;
    if argv.is_empty() {
        return Err(SpellbookError::CommandSplit("empty command".to_string()));
    }
    Ok(argv)
}

/// Spawn the command with inherited stdio and wait for it
pub fn run(cmd: &str) -> Result<ExitStatus> {
    let argv = split(cmd)?;
    spawn(&argv)
}

#[instrument(skip_all)]
fn spawn(argv: &[String]) -> Result<ExitStatus> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        SpellbookError::CommandSplit("empty command".to_string())
    })?;

    debug!(program = %program, args = ?args, "Spawning command");

    Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| {
            error!(error = %e, program = %program, "Process spawn failed");
            SpellbookError::ProcessSpawn {
                program: program.clone(),
                source: e,
            }
        })
}

/// The child's exit code, or -1 when it was ended by a signal
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Resolve, echo, run, and translate the status of a finished command.
///
/// Only the program name and exit code are logged at info; the full command
/// line carries user-typed values and goes to debug.
pub fn run_resolved(raw: &str) -> Result<i32> {
    let resolved = resolve_env(raw);
    println!("$ {}", resolved);

    let argv = split(&resolved)?;
    debug!(command = %resolved, "Running command");

    let start = Instant::now();
    let status = spawn(&argv)?;
    let code = exit_code(status);
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let program = argv.first().map(String::as_str).unwrap_or_default();
    logging::log_command_event(program, code, duration_ms);
    Ok(code)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

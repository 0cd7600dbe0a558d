//! Process delegation: run the target with the caller's arguments, verbatim,
//! stdio inherited, and adopt its exit status.

use std::ffi::OsString;
use std::process::Command;

use crate::error::LaunchError;
use crate::paths::LaunchPaths;

/// Run `target` with `args`, blocking until it exits. The target is resolved
/// on the current (activated) `PATH`, so environment binaries win. Returns
/// the child's exit code; a child killed by a signal maps to `128 + signo`.
pub fn run_target(
    paths: &LaunchPaths,
    target: &str,
    args: &[OsString],
) -> Result<i32, LaunchError> {
    let resolved = which::which(target).map_err(|e| LaunchError::Delegation {
        target: target.to_string(),
        detail: e.to_string(),
    })?;

    tracing::info!(target = %resolved.display(), args = args.len(), "Delegating");

    let status = Command::new(&resolved)
        .args(args)
        .current_dir(&paths.base_dir)
        .status()
        .map_err(|e| LaunchError::Delegation {
            target: target.to_string(),
            detail: e.to_string(),
        })?;

    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

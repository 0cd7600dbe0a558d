//! Interpreter discovery and version probing.
//!
//! The probed major.minor tag is a validated input: a missing interpreter or
//! unparseable version output fails the whole launch before any filesystem
//! mutation, rather than leaking a malformed tag into path construction.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use regex::Regex;

use crate::error::LaunchError;

/// Interpreter names tried in order when no override is configured.
const CANDIDATES: &[&str] = &["python3", "python"];

/// A probed interpreter: executable path plus its major.minor version tag.
#[derive(Debug, Clone)]
pub struct Interpreter {
    pub path: PathBuf,
    pub version: VersionTag,
}

/// Major.minor version identifier, e.g. `3.11`. Used as a path segment only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTag {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Locate an interpreter and probe its version. `override_name` (from
/// `VENVBOOT_PYTHON`) short-circuits the candidate list.
pub fn probe(override_name: Option<&str>) -> Result<Interpreter, LaunchError> {
    let names: Vec<&str> = match override_name {
        Some(name) => vec![name],
        None => CANDIDATES.to_vec(),
    };

    let mut last_err = String::new();
    for name in &names {
        let path = match which::which(name) {
            Ok(p) => p,
            Err(e) => {
                last_err = format!("{}: {}", name, e);
                continue;
            }
        };
        let output = match Command::new(&path).arg("--version").output() {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                last_err = format!(
                    "{}: --version exited with {}",
                    path.display(),
                    o.status.code().unwrap_or(-1)
                );
                continue;
            }
            Err(e) => {
                last_err = format!("{}: {}", path.display(), e);
                continue;
            }
        };
        // Python 2 prints to stderr, Python 3 to stdout
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };
        let version = parse_version_tag(&text).ok_or_else(|| {
            LaunchError::InterpreterNotFound(format!(
                "{} reported unparseable version output: {:?}",
                path.display(),
                text.trim()
            ))
        })?;
        tracing::debug!(interpreter = %path.display(), version = %version, "Probed interpreter");
        return Ok(Interpreter { path, version });
    }

    Err(LaunchError::InterpreterNotFound(format!(
        "tried {}; last error: {}",
        names.join(", "),
        last_err
    )))
}

/// Extract a major.minor tag from `--version` output (`"Python 3.11.4"` → 3.11).
pub fn parse_version_tag(output: &str) -> Option<VersionTag> {
    let re = Regex::new(r"(\d+)\.(\d+)").expect("static regex");
    let caps = re.captures(output)?;
    Some(VersionTag {
        major: caps[1].parse().ok()?,
        minor: caps[2].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cpython_banner() {
        let tag = parse_version_tag("Python 3.11.4\n").unwrap();
        assert_eq!(tag, VersionTag { major: 3, minor: 11 });
        assert_eq!(tag.to_string(), "3.11");
    }

    #[test]
    fn parses_patchless_and_rc_banners() {
        assert_eq!(
            parse_version_tag("Python 3.9").unwrap().to_string(),
            "3.9"
        );
        assert_eq!(
            parse_version_tag("Python 3.13.0rc1").unwrap().to_string(),
            "3.13"
        );
    }

    #[test]
    fn rejects_versionless_output() {
        assert!(parse_version_tag("command not found").is_none());
        assert!(parse_version_tag("").is_none());
    }

    #[test]
    fn probe_fails_for_nonexistent_interpreter() {
        let err = probe(Some("definitely-not-a-python-interpreter")).unwrap_err();
        assert!(matches!(err, LaunchError::InterpreterNotFound(_)));
    }
}

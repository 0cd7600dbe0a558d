//! Launcher configuration layer.
//!
//! All environment-variable reads are concentrated here; the rest of the
//! crate receives structured config values, never `std::env::var` calls.
//! A `.env` file next to the launcher is loaded first (without overriding
//! variables already set by the caller's shell).

use std::env;
use std::path::Path;

/// Environment variable key constants.
pub mod keys {
    pub const VENVBOOT_TARGET: &str = "VENVBOOT_TARGET";
    pub const VENVBOOT_ENV_DIR: &str = "VENVBOOT_ENV_DIR";
    pub const VENVBOOT_REQUIREMENTS: &str = "VENVBOOT_REQUIREMENTS";
    pub const VENVBOOT_PYTHON: &str = "VENVBOOT_PYTHON";
    pub const VENVBOOT_SITE_ROOT: &str = "VENVBOOT_SITE_ROOT";

    pub const VENVBOOT_QUIET: &str = "VENVBOOT_QUIET";
    pub const VENVBOOT_LOG_LEVEL: &str = "VENVBOOT_LOG_LEVEL";
    pub const VENVBOOT_LOG_JSON: &str = "VENVBOOT_LOG_JSON";
}

/// Read an environment variable, falling back to a default when unset or empty.
pub fn env_or<F>(key: &str, default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default)
}

/// Read an environment variable, treating empty values as unset.
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Parse a boolean environment variable: 0/false/no/off are false, anything
/// else set is true.
pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key).ok().as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

/// Load `<dir>/.env` into the process environment. Variables already set by
/// the caller's shell are never overridden. Missing or unreadable files are
/// silently skipped.
pub fn load_dotenv_from_dir(dir: &Path) {
    let path = dir.join(".env");
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return,
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();
            // Strip inline comment (# not inside quotes)
            if let Some(hash_pos) = value.find('#') {
                let before_hash = value[..hash_pos].trim_end();
                if !before_hash.contains('"') && !before_hash.contains('\'') {
                    value = before_hash;
                }
            }
            if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
                || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
            {
                value = &value[1..value.len() - 1];
            }
            if !key.is_empty() && env::var(key).is_err() {
                env::set_var(key, value);
            }
        }
    }
}

/// Launcher configuration, loaded from environment variables (after the
/// launcher-directory `.env` has been applied).
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Name of the executable to delegate to. Required.
    pub target: String,
    /// Environment root, relative to the launcher directory.
    pub env_dir: String,
    /// Dependency specification file, relative to the launcher directory.
    pub requirements: String,
    /// Optional interpreter override (name or path).
    pub python: Option<String>,
    /// System prefix for the version-qualified site-packages path.
    pub site_root: String,
}

impl LaunchConfig {
    /// Load from the environment. Fails only when `VENVBOOT_TARGET` is unset:
    /// the launcher defines no CLI flags, so the target name has nowhere else
    /// to come from.
    pub fn from_env() -> anyhow::Result<Self> {
        let target = env_optional(keys::VENVBOOT_TARGET).ok_or_else(|| {
            anyhow::anyhow!(
                "{} is not set; export it or add it to the .env next to the launcher",
                keys::VENVBOOT_TARGET
            )
        })?;
        Ok(Self {
            target,
            env_dir: env_or(keys::VENVBOOT_ENV_DIR, || "env".to_string()),
            requirements: env_or(keys::VENVBOOT_REQUIREMENTS, || {
                "requirements.txt".to_string()
            }),
            python: env_optional(keys::VENVBOOT_PYTHON),
            site_root: env_or(keys::VENVBOOT_SITE_ROOT, || "/usr/local/lib".to_string()),
        })
    }
}

/// Observability configuration (log level, quiet mode, JSON output).
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub quiet: bool,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or(keys::VENVBOOT_LOG_LEVEL, || {
                "venvboot=info,venvboot_env=info".to_string()
            }),
            quiet: env_bool(keys::VENVBOOT_QUIET, false),
            log_json: env_bool(keys::VENVBOOT_LOG_JSON, false),
        }
    }
}

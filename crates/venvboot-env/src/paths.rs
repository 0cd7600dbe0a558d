//! Working-directory resolution.
//!
//! Every on-disk location the launcher touches is anchored at the directory
//! containing the launcher executable itself, never the caller's cwd. The
//! resolved set of paths is passed explicitly to each step.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::LaunchConfig;

/// Resolved filesystem locations for one launch.
#[derive(Debug, Clone)]
pub struct LaunchPaths {
    /// Directory containing the launcher executable. Delegated processes run
    /// with this as their cwd.
    pub base_dir: PathBuf,
    /// Root of the isolated environment (`<base_dir>/env` by default).
    pub env_dir: PathBuf,
    /// Dependency specification file (`<base_dir>/requirements.txt` by default).
    pub requirements: PathBuf,
    /// System prefix for the version-qualified site-packages path.
    pub site_root: PathBuf,
}

impl LaunchPaths {
    /// Anchor all configured locations at the launcher's own directory.
    pub fn resolve(base_dir: PathBuf, config: &LaunchConfig) -> Self {
        Self {
            env_dir: base_dir.join(&config.env_dir),
            requirements: base_dir.join(&config.requirements),
            site_root: PathBuf::from(&config.site_root),
            base_dir,
        }
    }

    /// Directory of the launcher executable, canonicalized. Fails fast rather
    /// than proceeding with an ambiguous working directory.
    pub fn launcher_dir() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Resolve launcher executable path")?;
        let exe = exe
            .canonicalize()
            .with_context(|| format!("Canonicalize launcher path {}", exe.display()))?;
        exe.parent()
            .map(Path::to_path_buf)
            .context("Launcher executable has no parent directory")
    }

    /// The activation entry-point file whose presence marks a provisioned
    /// environment.
    pub fn activation_marker(&self) -> PathBuf {
        self.env_dir.join("bin").join("activate")
    }

    /// `bin` directory of the isolated environment.
    pub fn env_bin_dir(&self) -> PathBuf {
        self.env_dir.join("bin")
    }
}

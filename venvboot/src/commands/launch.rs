//! The bootstrap-and-delegate sequence.
//!
//! Resolve the launcher directory, probe the interpreter, ensure the
//! environment, activate it, layer the system site-packages path, delegate,
//! and let the guard deactivate on the way out.

use std::ffi::OsString;

use anyhow::{Context, Result};

use venvboot_env::activate::ActivationGuard;
use venvboot_env::config::{self, LaunchConfig};
use venvboot_env::paths::LaunchPaths;
use venvboot_env::{builder, delegate, interpreter};

/// Run the full launch sequence; returns the delegated program's exit code.
pub fn run(args: &[OsString]) -> Result<i32> {
    let base_dir = LaunchPaths::launcher_dir().context("Resolve working directory")?;
    config::load_dotenv_from_dir(&base_dir);
    let cfg = LaunchConfig::from_env()?;
    let paths = LaunchPaths::resolve(base_dir, &cfg);

    // Probe before any filesystem mutation: a missing interpreter must not
    // leave a half-created environment behind.
    let interpreter = interpreter::probe(cfg.python.as_deref())?;
    builder::ensure_environment(&paths, &interpreter)?;

    let mut activation = ActivationGuard::activate(&paths);
    activation.layer_site_packages(&paths, interpreter.version);

    let code = delegate::run_target(&paths, &cfg.target, args)?;

    // Explicit for readability; the guard would also deactivate on the error
    // paths above.
    drop(activation);
    Ok(code)
}

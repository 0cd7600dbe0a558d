//! Environment locator/builder: lazy, idempotent virtualenv provisioning.
//!
//! Presence of the activation entry-point (`<env>/bin/activate`) is the sole
//! marker checked; when it exists no command runs at all. Creation binds the
//! venv to the probed interpreter and installs every dependency entry before
//! the environment is considered usable.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::LaunchError;
use crate::interpreter::Interpreter;
use crate::paths::LaunchPaths;
use crate::requirements::DependencySpec;

/// True when the activation marker already exists on disk.
pub fn environment_ready(paths: &LaunchPaths) -> bool {
    paths.activation_marker().exists()
}

/// Ensure the isolated environment exists and is fully provisioned.
/// Idempotent: an existing marker skips creation and installation entirely.
pub fn ensure_environment(
    paths: &LaunchPaths,
    interpreter: &Interpreter,
) -> Result<(), LaunchError> {
    if environment_ready(paths) {
        tracing::debug!(env = %paths.env_dir.display(), "Environment present, skipping provisioning");
        return Ok(());
    }

    let spec = DependencySpec::from_file(&paths.requirements).map_err(|e| {
        LaunchError::Provisioning {
            stage: "dependency specification",
            detail: format!("{:#}", e),
        }
    })?;

    tracing::info!(
        env = %paths.env_dir.display(),
        interpreter = %interpreter.path.display(),
        packages = spec.len(),
        "Provisioning isolated environment"
    );

    create_venv(&interpreter.path, &paths.env_dir, &paths.base_dir)?;
    if !spec.is_empty() {
        install_dependencies(paths, &spec)?;
    }

    // The interpreter toolchain is expected to produce the marker; a venv
    // that finished without one is not usable.
    if !environment_ready(paths) {
        return Err(LaunchError::Provisioning {
            stage: "venv creation",
            detail: format!(
                "no activation entry-point at {}",
                paths.activation_marker().display()
            ),
        });
    }

    Ok(())
}

fn create_venv(python: &Path, env_dir: &Path, cwd: &Path) -> Result<(), LaunchError> {
    let out = Command::new(python)
        .arg("-m")
        .arg("venv")
        .arg(env_dir)
        .current_dir(cwd)
        .output()
        .map_err(|e| LaunchError::Provisioning {
            stage: "venv creation",
            detail: format!("spawn {}: {}", python.display(), e),
        })?;
    if !out.status.success() {
        return Err(LaunchError::Provisioning {
            stage: "venv creation",
            detail: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(())
}

fn install_dependencies(paths: &LaunchPaths, spec: &DependencySpec) -> Result<(), LaunchError> {
    let mut cmd = pip_install_command(&paths.env_dir);
    cmd.args(&spec.entries).current_dir(&paths.base_dir);

    let out = cmd.output().map_err(|e| LaunchError::Provisioning {
        stage: "dependency installation",
        detail: format!("spawn pip: {}", e),
    })?;
    if !out.status.success() {
        return Err(LaunchError::Provisioning {
            stage: "dependency installation",
            detail: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    tracing::info!(packages = spec.len(), "Dependency specification installed");
    Ok(())
}

/// Prefer the venv's own `pip`; fall back to `python -m pip` when the binary
/// is absent (some distributions ship venvs without a pip shim).
fn pip_install_command(env_dir: &Path) -> Command {
    let pip: PathBuf = env_dir.join("bin").join("pip");
    if pip.exists() {
        let mut c = Command::new(pip);
        c.arg("install");
        c
    } else {
        let mut c = Command::new(env_dir.join("bin").join("python"));
        c.arg("-m").arg("pip").arg("install");
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaunchConfig;
    use std::fs;

    fn paths_in(dir: &Path) -> LaunchPaths {
        let config = LaunchConfig {
            target: "server_main".into(),
            env_dir: "env".into(),
            requirements: "requirements.txt".into(),
            python: None,
            site_root: "/usr/local/lib".into(),
        };
        LaunchPaths::resolve(dir.to_path_buf(), &config)
    }

    #[test]
    fn environment_ready_iff_marker_exists() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        assert!(!environment_ready(&paths));

        fs::create_dir_all(paths.env_bin_dir()).unwrap();
        fs::write(paths.activation_marker(), "# activate\n").unwrap();
        assert!(environment_ready(&paths));
    }

    #[test]
    fn existing_marker_skips_provisioning_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::create_dir_all(paths.env_bin_dir()).unwrap();
        fs::write(paths.activation_marker(), "# activate\n").unwrap();

        // No requirements file and a bogus interpreter path: would both fail
        // if provisioning ran. The marker makes this a no-op.
        let interpreter = Interpreter {
            path: PathBuf::from("/nonexistent/python"),
            version: crate::interpreter::VersionTag { major: 3, minor: 11 },
        };
        ensure_environment(&paths, &interpreter).unwrap();
    }

    #[test]
    fn missing_requirements_file_aborts_provisioning() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        let interpreter = Interpreter {
            path: PathBuf::from("/nonexistent/python"),
            version: crate::interpreter::VersionTag { major: 3, minor: 11 },
        };
        let err = ensure_environment(&paths, &interpreter).unwrap_err();
        match err {
            LaunchError::Provisioning { stage, .. } => {
                assert_eq!(stage, "dependency specification")
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing was created.
        assert!(!paths.env_dir.exists());
    }

    #[test]
    fn unspawnable_interpreter_is_a_creation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::write(&paths.requirements, "uvloop\n").unwrap();
        let interpreter = Interpreter {
            path: PathBuf::from("/nonexistent/python"),
            version: crate::interpreter::VersionTag { major: 3, minor: 11 },
        };
        let err = ensure_environment(&paths, &interpreter).unwrap_err();
        match err {
            LaunchError::Provisioning { stage, .. } => assert_eq!(stage, "venv creation"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

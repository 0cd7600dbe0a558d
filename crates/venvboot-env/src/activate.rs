//! Environment activation/deactivation.
//!
//! Activation mutates the process environment table so that the isolated
//! environment's binaries and packages take precedence; the child inherits
//! the mutated table. `ActivationGuard` records every prior value and
//! restores all of them on drop, so deactivation runs on every exit path —
//! not only after a successful delegation.
//!
//! All `std::env` writes in this crate go through the two helpers below.

use std::env;
use std::ffi::OsString;

use crate::interpreter::VersionTag;
use crate::paths::LaunchPaths;

const PATH: &str = "PATH";
const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
const PYTHONHOME: &str = "PYTHONHOME";
const PYTHONPATH: &str = "PYTHONPATH";

fn set_env_var(key: &str, value: &OsString) {
    env::set_var(key, value);
}

fn remove_env_var(key: &str) {
    env::remove_var(key);
}

/// RAII guard over the activation mutations. Dropping it restores every
/// variable it touched to its pre-activation state.
#[derive(Debug)]
pub struct ActivationGuard {
    saved: Vec<(&'static str, Option<OsString>)>,
}

impl ActivationGuard {
    /// Activate the isolated environment: set `VIRTUAL_ENV`, prepend the env
    /// `bin` directory to `PATH`, clear `PYTHONHOME`.
    pub fn activate(paths: &LaunchPaths) -> Self {
        let mut guard = Self { saved: Vec::new() };

        guard.save(VIRTUAL_ENV);
        guard.save(PATH);
        guard.save(PYTHONHOME);

        set_env_var(VIRTUAL_ENV, &paths.env_dir.clone().into_os_string());

        let old_path = env::var_os(PATH).unwrap_or_default();
        let mut entries = vec![paths.env_bin_dir()];
        entries.extend(env::split_paths(&old_path));
        let new_path = env::join_paths(entries).unwrap_or_else(|_| old_path.clone());
        set_env_var(PATH, &new_path);

        remove_env_var(PYTHONHOME);

        tracing::debug!(env = %paths.env_dir.display(), "Environment activated");
        guard
    }

    /// Layer the fixed, version-qualified system site-packages path onto
    /// `PYTHONPATH`, ahead of whatever the caller's shell had set. Runs after
    /// activation, so it stacks on top of the venv's own paths.
    pub fn layer_site_packages(&mut self, paths: &LaunchPaths, version: VersionTag) {
        self.save(PYTHONPATH);
        let site = paths
            .site_root
            .join(format!("python{}", version))
            .join("site-packages");
        let existing = env::var(PYTHONPATH).ok();
        let value = compose_pythonpath(&site.to_string_lossy(), existing.as_deref());
        set_env_var(PYTHONPATH, &OsString::from(value));
    }

    fn save(&mut self, key: &'static str) {
        self.saved.push((key, env::var_os(key)));
    }
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        // Reverse order: last saved, first restored.
        for (key, prior) in self.saved.drain(..).rev() {
            match prior {
                Some(value) => set_env_var(key, &value),
                None => remove_env_var(key),
            }
        }
        tracing::debug!("Environment deactivated");
    }
}

/// `<site>:<existing>`; just `<site>` when nothing was inherited (an empty
/// trailing entry would make Python add the cwd to `sys.path`).
pub fn compose_pythonpath(site: &str, existing: Option<&str>) -> String {
    match existing {
        Some(p) if !p.is_empty() => format!("{}:{}", site, p),
        _ => site.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::env_lock;
    use super::*;
    use crate::config::LaunchConfig;
    use std::path::PathBuf;

    fn paths() -> LaunchPaths {
        let config = LaunchConfig {
            target: "server_main".into(),
            env_dir: "env".into(),
            requirements: "requirements.txt".into(),
            python: None,
            site_root: "/usr/local/lib".into(),
        };
        LaunchPaths::resolve(PathBuf::from("/opt/app"), &config)
    }

    #[test]
    fn compose_pythonpath_prepends_site_path() {
        assert_eq!(
            compose_pythonpath("/usr/local/lib/python3.11/site-packages", Some("/extra")),
            "/usr/local/lib/python3.11/site-packages:/extra"
        );
        assert_eq!(
            compose_pythonpath("/usr/local/lib/python3.11/site-packages", None),
            "/usr/local/lib/python3.11/site-packages"
        );
        assert_eq!(
            compose_pythonpath("/usr/local/lib/python3.11/site-packages", Some("")),
            "/usr/local/lib/python3.11/site-packages"
        );
    }

    #[test]
    fn activation_mutates_and_drop_restores() {
        let _lock = env_lock();
        let orig_path = env::var_os(PATH);
        env::set_var(PATH, "/usr/bin:/bin");
        env::remove_var(VIRTUAL_ENV);
        env::set_var(PYTHONHOME, "/stale/home");
        env::set_var(PYTHONPATH, "/caller/libs");

        {
            let mut guard = ActivationGuard::activate(&paths());
            assert_eq!(env::var(VIRTUAL_ENV).unwrap(), "/opt/app/env");
            assert!(env::var(PATH).unwrap().starts_with("/opt/app/env/bin:"));
            assert!(env::var(PYTHONHOME).is_err());

            guard.layer_site_packages(&paths(), VersionTag { major: 3, minor: 11 });
            assert_eq!(
                env::var(PYTHONPATH).unwrap(),
                "/usr/local/lib/python3.11/site-packages:/caller/libs"
            );
        }

        assert_eq!(env::var(PATH).unwrap(), "/usr/bin:/bin");
        assert!(env::var(VIRTUAL_ENV).is_err());
        assert_eq!(env::var(PYTHONHOME).unwrap(), "/stale/home");
        assert_eq!(env::var(PYTHONPATH).unwrap(), "/caller/libs");

        env::remove_var(PYTHONHOME);
        env::remove_var(PYTHONPATH);
        match orig_path {
            Some(p) => env::set_var(PATH, p),
            None => env::remove_var(PATH),
        }
    }

    #[test]
    fn drop_restores_even_when_unwinding() {
        let _lock = env_lock();
        let orig_path = env::var_os(PATH);
        env::set_var(PATH, "/usr/bin:/bin");
        env::remove_var(VIRTUAL_ENV);

        let result = std::panic::catch_unwind(|| {
            let _guard = ActivationGuard::activate(&paths());
            panic!("delegation blew up");
        });
        assert!(result.is_err());
        assert_eq!(env::var(PATH).unwrap(), "/usr/bin:/bin");
        assert!(env::var(VIRTUAL_ENV).is_err());
        match orig_path {
            Some(p) => env::set_var(PATH, p),
            None => env::remove_var(PATH),
        }
    }

    #[test]
    fn missing_pythonpath_yields_bare_site_path() {
        let _lock = env_lock();
        env::remove_var(PYTHONPATH);
        let mut guard = ActivationGuard::activate(&paths());
        guard.layer_site_packages(&paths(), VersionTag { major: 3, minor: 9 });
        assert_eq!(
            env::var(PYTHONPATH).unwrap(),
            "/usr/local/lib/python3.9/site-packages"
        );
        drop(guard);
        assert!(env::var(PYTHONPATH).is_err());
    }
}

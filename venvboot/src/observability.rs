//! Tracing init. Honors VENVBOOT_LOG_LEVEL / VENVBOOT_QUIET / VENVBOOT_LOG_JSON,
//! with RUST_LOG taking precedence when set.

use tracing_subscriber::{prelude::*, EnvFilter};

use venvboot_env::config::ObservabilityConfig;

/// Initialize tracing. Call at process startup.
/// When VENVBOOT_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "venvboot=warn,venvboot_env=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

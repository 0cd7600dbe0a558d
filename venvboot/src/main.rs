mod commands;
mod observability;

use std::ffi::OsString;
use std::process;

use venvboot_env::error::LaunchError;

fn main() {
    observability::init_tracing();

    // No flags of our own: everything after the program name is forwarded
    // verbatim to the delegated target.
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    match commands::launch::run(&args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            tracing::error!("Launch failed: {:#}", err);
            let code = err
                .downcast_ref::<LaunchError>()
                .map(LaunchError::exit_code)
                .unwrap_or(1);
            process::exit(code);
        }
    }
}

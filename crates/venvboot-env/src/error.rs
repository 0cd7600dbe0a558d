//! Failure taxonomy for the launch sequence.
//!
//! Delegated-program exit codes are not errors: a child that starts and exits
//! non-zero propagates its code through `delegate::run_target` as a plain
//! value. These variants cover the launcher's own failures only.

use thiserror::Error;

/// Errors that abort the launch before or at delegation.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("No usable Python interpreter: {0}")]
    InterpreterNotFound(String),

    #[error("Environment provisioning failed during {stage}: {detail}")]
    Provisioning { stage: &'static str, detail: String },

    #[error("Cannot start target '{target}': {detail}")]
    Delegation { target: String, detail: String },
}

impl LaunchError {
    /// Process exit status for this failure. Unstartable targets use the
    /// conventional 127; everything else is a generic 1. Only "non-zero" is
    /// contractual.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Delegation { .. } => 127,
            _ => 1,
        }
    }
}

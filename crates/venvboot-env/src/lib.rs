//! Provisioning core for the venvboot launcher.
//!
//! The launch sequence composes these modules in order: resolve paths, probe
//! the interpreter, ensure the environment, activate it, layer the system
//! site-packages path, delegate, and (via guard drop) deactivate.

pub mod activate;
pub mod builder;
pub mod config;
pub mod delegate;
pub mod error;
pub mod interpreter;
pub mod paths;
pub mod requirements;

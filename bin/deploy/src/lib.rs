//! The `rollup-deploy` command line interface.
//!
//! Each command builds a deployment plan from the environment and an optional rollup config
//! file, then runs it against the configured chain. Deployed addresses are printed to stdout,
//! logs go to stderr.

pub mod args;
pub use args::{Cli, Command};

mod commands;

pub mod constants;

pub mod plan;

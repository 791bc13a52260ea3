//! Command line interface module
//!
//! Argument parsing, validation, and the runner that sequences the
//! resolve-login-pull-run pipeline.

pub mod args;
pub mod runner;

pub use args::Args;
pub use runner::Runner;

//! Presentation layer: the command-line host.

/// CLI subcommand handling.
pub mod cli;

pub use cli::{CliHost, WarmUpPolicy};

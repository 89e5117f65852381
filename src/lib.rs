//! memeoff - caption images with meme formats.
//!
//! Source images come from a message attachment, a URL, or a random image
//! cache that scrapes content sources in the background. The crate is layered
//! the usual way: pure domain types and ports, application services that
//! implement the pipeline, infrastructure adapters, and a CLI host.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services, use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing the command-line host.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "memeoff";

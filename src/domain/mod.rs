//! Domain layer with core entities, errors, ports and parsing.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Domain services.
pub mod services;

pub use entities::{CachePool, Command, PoolKind, RenderableImage};
pub use errors::{MemeError, StartupError};
pub use services::CommandParser;

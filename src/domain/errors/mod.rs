//! Domain error types.

mod meme_error;
mod startup_error;

pub use meme_error::{MemeError, MemeErrorKind};
pub use startup_error::StartupError;

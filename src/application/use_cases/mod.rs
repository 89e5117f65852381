//! Use case implementations.

mod generate_meme_use_case;

pub use generate_meme_use_case::{GenerateMemeUseCase, MemeSettings, options};

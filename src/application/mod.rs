//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Image fetching, the random image cache and caption layout.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{ImageSource, MemeReply, MemeRequest};
pub use services::{ImageFetcher, PoolStats, RandomImageCache, UpdateOptions, UpdateReport};
pub use use_cases::{GenerateMemeUseCase, MemeSettings};

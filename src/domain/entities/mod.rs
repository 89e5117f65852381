//! Domain entity definitions.

mod cache_entry;
mod command;
mod font_spec;
mod renderable_image;

pub use cache_entry::{CacheEntry, CachePool, PoolKind, timestamp_now};
pub use command::Command;
pub use font_spec::FontSpec;
pub use renderable_image::{ImageFileType, RenderableImage};

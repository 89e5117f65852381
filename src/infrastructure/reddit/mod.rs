//! Reddit listing scraper.

mod client;
mod dto;

pub use client::RedditScraper;

//! Core types and traits for the Blink URL shortener.
//!
//! This crate provides the shared vocabulary used by the storage, cache,
//! generator and shortener crates.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::UrlCache;
pub use error::{CacheError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, ShortenedUrl, Shortener};

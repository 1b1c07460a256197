//! URL shortener service implementation.
//!
//! This crate wires a [`Repository`](blink_core::Repository), a
//! [`UrlCache`](blink_core::UrlCache) and a
//! [`Generator`](blink_generator::Generator) into the cache-aside
//! [`ShortenerService`]. Core types are re-exported from `blink_core`.

pub mod clicks;
pub mod service;

pub use blink_core::{ShortenParams, ShortenedUrl, Shortener, ShortenerError};
pub use clicks::ClickRecorder;
pub use service::{ShortenerService, ShortenerSettings, MAX_URL_LENGTH};

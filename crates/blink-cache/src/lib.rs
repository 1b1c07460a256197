//! Cache implementations for the Blink URL shortener.

pub mod layered;
pub mod moka;
pub mod null;
pub mod redis;

pub use blink_core::cache::{Result, UrlCache};
pub use blink_core::CacheError;
pub use layered::LayeredCache;
pub use self::moka::MokaUrlCache;
pub use null::NullCache;
pub use self::redis::RedisUrlCache;

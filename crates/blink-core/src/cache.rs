use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A cache of the short code to original URL projection.
///
/// Entries are derived data and never the source of truth: a miss says
/// nothing about whether the code exists in the repository.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the original URL from cache.
    ///
    /// Returns `Ok(None)` if the key was never set or has expired; the two
    /// cases are indistinguishable.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the original URL in cache, expiring after `ttl`.
    ///
    /// Overwrites any existing entry for `code` and resets its expiry.
    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<T: UrlCache + ?Sized> UrlCache for Arc<T> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        (**self).get_url(code).await
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        (**self).set_url(code, original_url, ttl).await
    }
}

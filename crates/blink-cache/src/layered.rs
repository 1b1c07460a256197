use async_trait::async_trait;
use blink_core::{CacheError, ShortCode, UrlCache};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::Result;

/// Default lifetime of entries copied from L2 into L1.
pub const DEFAULT_BACKFILL_TTL: Duration = Duration::from_secs(5 * 60);

/// A multi-layer cache that composes two cache implementations.
///
/// L1 is typically a fast, local cache (e.g., Moka in-memory cache) and
/// L2 is typically a slower, distributed cache (e.g., Redis).
///
/// # Operation Strategy
///
/// - **Get**: Try L1 first, if miss try L2. If L2 has the value, populate L1
///   with it for `backfill_ttl`.
/// - **Set**: Write to both L1 and L2.
///
/// The remaining lifetime of an L2 entry is unknown to L1, so backfilled
/// entries use a short fixed TTL to bound staleness.
///
/// # Example
///
/// ```rust
/// use blink_cache::{LayeredCache, MokaUrlCache};
///
/// let l1 = MokaUrlCache::with_capacity(10_000);
/// // let l2 = RedisUrlCache::connect("redis://127.0.0.1:6379").await?;
/// // let cache = LayeredCache::new(l1, l2);
/// ```
#[derive(Debug, Clone)]
pub struct LayeredCache<L1, L2> {
    l1: L1,
    l2: L2,
    backfill_ttl: Duration,
}

impl<L1, L2> LayeredCache<L1, L2> {
    /// Creates a new layered cache with the given L1 and L2 caches.
    pub fn new(l1: L1, l2: L2) -> Self {
        Self {
            l1,
            l2,
            backfill_ttl: DEFAULT_BACKFILL_TTL,
        }
    }

    /// Overrides the TTL used when copying L2 hits into L1.
    pub fn with_backfill_ttl(mut self, ttl: Duration) -> Self {
        self.backfill_ttl = ttl;
        self
    }

    /// Returns a reference to the L1 cache.
    pub fn l1(&self) -> &L1 {
        &self.l1
    }

    /// Returns a reference to the L2 cache.
    pub fn l2(&self) -> &L2 {
        &self.l2
    }
}

#[async_trait]
impl<L1, L2> UrlCache for LayeredCache<L1, L2>
where
    L1: UrlCache,
    L2: UrlCache,
{
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching URL from layered cache");

        match self.l1.get_url(code).await {
            Ok(Some(url)) => {
                debug!(code = %code, "L1 cache hit");
                return Ok(Some(url));
            }
            Ok(None) => trace!(code = %code, "L1 cache miss, trying L2"),
            Err(e) => warn!(code = %code, error = %e, "L1 cache error, trying L2"),
        }

        match self.l2.get_url(code).await? {
            Some(url) => {
                debug!(code = %code, "L2 cache hit, backfilling L1");
                if let Err(e) = self.l1.set_url(code, &url, self.backfill_ttl).await {
                    warn!(code = %code, error = %e, "Failed to backfill L1 cache");
                }
                Ok(Some(url))
            }
            None => {
                trace!(code = %code, "L2 cache miss");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, "Storing URL in both cache layers");

        let l1 = self.l1.set_url(code, original_url, ttl).await;
        let l2 = self.l2.set_url(code, original_url, ttl).await;

        match (l1, l2) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(l1), Err(l2)) => Err(CacheError::Operation(format!(
                "both cache layers failed: L1: {l1}; L2: {l2}"
            ))),
        }
    }
}

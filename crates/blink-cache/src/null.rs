//! No-op cache implementation for disabled caching.

use async_trait::async_trait;
use blink_core::{ShortCode, UrlCache};
use std::time::Duration;
use tracing::debug;

use crate::Result;

/// A cache implementation that stores nothing.
///
/// Every read misses and every write succeeds, so all lookups go to the
/// repository. Used when caching is disabled by configuration.
#[derive(Debug, Clone, Copy)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for NullCache {
    async fn get_url(&self, _code: &ShortCode) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_url(&self, _code: &ShortCode, _original_url: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

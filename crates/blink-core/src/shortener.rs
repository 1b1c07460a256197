use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// Optional caller-chosen slug, validated by the shortener.
    pub custom_slug: Option<String>,
}

/// The outcome of a successful [`Shortener::shorten`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedUrl {
    pub short_code: ShortCode,
    /// The fully-qualified public link, `base_url/short_code`.
    pub short_url: String,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Persists a new mapping and returns its public short link.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedUrl>;

    /// Resolves a short code to the original URL for a redirect, counting
    /// the click in the background.
    ///
    /// Returns `Err(ShortenerError::NotFound)` if the code does not exist.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Reads the full stored record, bypassing the cache and without
    /// counting a click.
    async fn lookup(&self, code: &ShortCode) -> Result<UrlRecord>;
}

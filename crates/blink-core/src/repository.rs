use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// The unique lookup key.
    pub short_code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// Number of redirects served for this code.
    pub click_count: u64,
    /// Set when the caller chose the code; equals `short_code`.
    pub custom_slug: Option<String>,
}

impl UrlRecord {
    /// Creates a fresh record with a zero click count.
    ///
    /// The custom slug column is filled in when `short_code` is a
    /// [`ShortCode::Custom`].
    pub fn new(short_code: ShortCode, original_url: impl Into<String>) -> Self {
        let custom_slug = short_code
            .is_custom()
            .then(|| short_code.as_str().to_string());
        Self {
            short_code,
            original_url: original_url.into(),
            click_count: 0,
            custom_slug,
        }
    }
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Finds the record whose short code equals `code`, or failing that,
    /// the record whose custom slug equals `code`.
    ///
    /// Returns `None` if neither matches.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;
}

/// The durable, authoritative store of URL mappings.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new record.
    ///
    /// Returns `Err(StorageError::Conflict)` if the short code or the
    /// custom slug already exists.
    async fn save(&self, record: &UrlRecord) -> Result<()>;

    /// Atomically increments the click counter of the record whose short
    /// code equals `code`.
    ///
    /// Returns `Err(StorageError::NotFound)` if no such record exists.
    async fn increment_click_count(&self, code: &ShortCode) -> Result<()>;
}

#[async_trait]
impl<T: ReadRepository + ?Sized> ReadRepository for Arc<T> {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        (**self).find_by_code(code).await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn save(&self, record: &UrlRecord) -> Result<()> {
        (**self).save(record).await
    }

    async fn increment_click_count(&self, code: &ShortCode) -> Result<()> {
        (**self).increment_click_count(code).await
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blink_core::{
    Repository, ShortCode, ShortenParams, ShortenedUrl, Shortener, ShortenerError, StorageError,
    UrlCache, UrlRecord,
};
use blink_generator::Generator;
use tracing::{debug, error, trace, warn};
use typed_builder::TypedBuilder;
use url::Url;

use crate::clicks::ClickRecorder;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_MAX_GENERATE_ATTEMPTS: usize = 3;
/// Longest destination URL accepted, in bytes. Matches the width of the
/// `original_url` column in the MySQL schema.
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Public prefix of every short link.
    #[builder(default = DEFAULT_BASE_URL.to_string(), setter(into))]
    base_url: String,
    /// Lifetime of entries written to the cache.
    #[builder(default = DEFAULT_CACHE_TTL)]
    cache_ttl: Duration,
    /// How many generated codes to try before giving up on collisions.
    #[builder(default = DEFAULT_MAX_GENERATE_ATTEMPTS)]
    max_generate_attempts: usize,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ShortenerSettings {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }
}

/// A concrete implementation of the `Shortener` trait.
///
/// Writes go to the repository first and are then copied into the cache.
/// Reads check the cache, fall back to the repository on a miss, and
/// repopulate the cache from what the repository returned. Cache failures
/// never fail a request.
pub struct ShortenerService<R, C, G> {
    repository: Arc<R>,
    cache: Arc<C>,
    generator: Arc<G>,
    clicks: ClickRecorder<R>,
    settings: ShortenerSettings,
}

impl<R, C, G> Clone for ShortenerService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            clicks: self.clicks.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, C: UrlCache, G: Generator> ShortenerService<R, C, G> {
    pub fn new(repository: R, cache: C, generator: G, settings: ShortenerSettings) -> Self {
        let repository = Arc::new(repository);
        Self {
            clicks: ClickRecorder::new(Arc::clone(&repository)),
            repository,
            cache: Arc::new(cache),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    /// Accepts only absolute `http`/`https` URLs that name a host.
    ///
    /// The raw string is what gets stored and later sent back as a
    /// `Location` header, so anything the URL parser would silently strip
    /// (control characters, surrounding whitespace) is rejected up front.
    fn validate_url(raw: &str) -> Result<(), ShortenerError> {
        if raw.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        if raw.len() > MAX_URL_LENGTH {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL is longer than {MAX_URL_LENGTH} bytes"
            )));
        }

        if raw.trim() != raw {
            return Err(ShortenerError::InvalidUrl(
                "URL must not have surrounding whitespace".to_string(),
            ));
        }

        if raw.chars().any(|c| c.is_control()) {
            return Err(ShortenerError::InvalidUrl(
                "URL must not contain control characters".to_string(),
            ));
        }

        let url = Url::parse(raw)
            .map_err(|e| ShortenerError::InvalidUrl(format!("{raw}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                url.scheme()
            )));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {raw}"
            ))),
        }
    }

    /// Saves under freshly generated codes until one is free.
    async fn save_generated(&self, original_url: &str) -> Result<ShortCode, ShortenerError> {
        let attempts = self.settings.max_generate_attempts.max(1);

        for attempt in 1..=attempts {
            let code = self.generator.generate();
            let record = UrlRecord::new(code.clone(), original_url);

            match self.repository.save(&record).await {
                Ok(()) => return Ok(code),
                Err(StorageError::Conflict(_)) => {
                    debug!(code = %code, attempt, "Generated code already taken");
                }
                Err(e) => {
                    error!(code = %code, error = %e, "Failed to save URL mapping");
                    return Err(e.into());
                }
            }
        }

        warn!(attempts, "Gave up generating a free short code");
        Err(ShortenerError::AliasConflict(format!(
            "no free short code after {attempts} attempts"
        )))
    }

    async fn populate_cache(&self, code: &ShortCode, original_url: &str) {
        if let Err(e) = self
            .cache
            .set_url(code, original_url, self.settings.cache_ttl)
            .await
        {
            warn!(code = %code, error = %e, "Failed to populate cache");
        }
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache, G: Generator> Shortener for ShortenerService<R, C, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedUrl, ShortenerError> {
        Self::validate_url(&params.original_url)?;
        let custom = params.custom_slug.map(ShortCode::new).transpose()?;

        let short_code = match custom {
            Some(code) => {
                let record = UrlRecord::new(code.clone(), params.original_url.as_str());
                self.repository.save(&record).await.map_err(|e| {
                    match &e {
                        StorageError::Conflict(_) => debug!(code = %code, "Custom slug taken"),
                        _ => error!(code = %code, error = %e, "Failed to save URL mapping"),
                    }
                    ShortenerError::from(e)
                })?;
                code
            }
            None => self.save_generated(&params.original_url).await?,
        };

        self.populate_cache(&short_code, &params.original_url).await;

        let short_url = short_code.to_url(&self.settings.base_url);
        debug!(code = %short_code, url = %params.original_url, "Shortened URL");

        Ok(ShortenedUrl {
            short_code,
            short_url,
        })
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String, ShortenerError> {
        trace!(code = %code, "Resolving short code");

        match self.cache.get_url(code).await {
            Ok(Some(url)) => {
                debug!(code = %code, "Cache hit");
                self.clicks.record(code.clone());
                return Ok(url);
            }
            Ok(None) => trace!(code = %code, "Cache miss"),
            Err(e) => {
                warn!(code = %code, error = %e, "Cache error, falling back to repository");
            }
        }

        let record = match self.repository.find_by_code(code).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(code = %code, "Short code not found");
                return Err(ShortenerError::NotFound(code.to_string()));
            }
            Err(e) => {
                error!(code = %code, error = %e, "Failed to read URL mapping");
                return Err(e.into());
            }
        };

        self.populate_cache(&record.short_code, &record.original_url)
            .await;
        self.clicks.record(record.short_code.clone());

        Ok(record.original_url)
    }

    async fn lookup(&self, code: &ShortCode) -> Result<UrlRecord, ShortenerError> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))
    }
}

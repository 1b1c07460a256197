use async_trait::async_trait;
use blink_core::error::StorageError;
use blink_core::repository::{ReadRepository, Repository, Result, UrlRecord};
use blink_core::shortcode::ShortCode;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

/// In-memory implementation of the Repository traits using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking.
///
/// `slugs` is a secondary unique index from custom slug to short code.
/// Writers always lock `slugs` before `records`.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: DashMap<String, UrlRecord>,
    slugs: DashMap<String, String>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            slugs: DashMap::new(),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let key = code.as_str();

        if let Some(record) = self.records.get(key) {
            return Ok(Some(record.clone()));
        }

        let Some(short_code) = self.slugs.get(key).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };

        Ok(self.records.get(&short_code).map(|record| record.clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, record: &UrlRecord) -> Result<()> {
        let key = record.short_code.as_str().to_owned();

        let slug_entry = match &record.custom_slug {
            Some(slug) => match self.slugs.entry(slug.clone()) {
                Entry::Occupied(_) => return Err(StorageError::Conflict(slug.clone())),
                Entry::Vacant(vacant) => Some(vacant),
            },
            None => None,
        };

        match self.records.entry(key.clone()) {
            Entry::Occupied(_) => return Err(StorageError::Conflict(key)),
            Entry::Vacant(vacant) => {
                vacant.insert(UrlRecord {
                    click_count: 0,
                    ..record.clone()
                });
            }
        }

        if let Some(vacant) = slug_entry {
            vacant.insert(key);
        }

        trace!(code = %record.short_code, "Saved URL mapping in memory");
        Ok(())
    }

    async fn increment_click_count(&self, code: &ShortCode) -> Result<()> {
        match self.records.get_mut(code.as_str()) {
            Some(mut record) => {
                record.click_count += 1;
                Ok(())
            }
            None => Err(StorageError::NotFound(code.to_string())),
        }
    }
}

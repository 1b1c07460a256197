use std::sync::Arc;

use blink_core::{Repository, ShortCode};
use tokio::task::JoinHandle;
use tracing::{debug_span, trace, warn, Instrument};

/// Counts redirects without holding up the response.
///
/// Each click is a detached task; failures are logged and dropped.
#[derive(Debug)]
pub struct ClickRecorder<R> {
    repository: Arc<R>,
}

impl<R> Clone for ClickRecorder<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: Repository> ClickRecorder<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Spawns the increment for `code` on the current runtime.
    ///
    /// The handle is only useful to tests; callers on the request path drop it.
    pub fn record(&self, code: ShortCode) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let span = debug_span!("record_click", code = %code);

        tokio::spawn(
            async move {
                match repository.increment_click_count(&code).await {
                    Ok(()) => trace!("Click recorded"),
                    Err(e) => warn!(error = %e, "Failed to record click"),
                }
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blink_core::repository::Result;
    use blink_core::{ReadRepository, StorageError, UrlRecord};
    use blink_storage::InMemoryRepository;

    #[tokio::test]
    async fn increments_counter() {
        let repo = Arc::new(InMemoryRepository::new());
        let code = ShortCode::generated("abc123");
        repo.save(&UrlRecord::new(code.clone(), "https://example.com"))
            .await
            .unwrap();

        let recorder = ClickRecorder::new(Arc::clone(&repo));
        recorder.record(code.clone()).await.unwrap();
        recorder.record(code.clone()).await.unwrap();

        let record = repo.find_by_code(&code).await.unwrap().unwrap();
        assert_eq!(record.click_count, 2);
    }

    #[tokio::test]
    async fn missing_code_does_not_panic_the_task() {
        let recorder = ClickRecorder::new(Arc::new(InMemoryRepository::new()));

        recorder
            .record(ShortCode::new_unchecked("ghost"))
            .await
            .expect("task completes even when the increment fails");
    }

    struct DownRepository;

    #[async_trait]
    impl ReadRepository for DownRepository {
        async fn find_by_code(&self, _code: &ShortCode) -> Result<Option<UrlRecord>> {
            Err(StorageError::Unavailable("down".into()))
        }
    }

    #[async_trait]
    impl Repository for DownRepository {
        async fn save(&self, _record: &UrlRecord) -> Result<()> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn increment_click_count(&self, _code: &ShortCode) -> Result<()> {
            Err(StorageError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn storage_failure_is_swallowed() {
        let recorder = ClickRecorder::new(Arc::new(DownRepository));

        recorder
            .record(ShortCode::new_unchecked("abc123"))
            .await
            .unwrap();
    }
}

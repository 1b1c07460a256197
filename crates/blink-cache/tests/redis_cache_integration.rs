use std::time::Duration;

use blink_cache::{RedisUrlCache, UrlCache};
use blink_core::ShortCode;
use blink_test_infra::redis::RedisServer;
use redis::AsyncCommands;

const TTL: Duration = Duration::from_secs(60);

/// Test fixture that manages a Redis container using test-infra.
struct RedisTestContainer {
    _redis: RedisServer,
    redis_url: String,
}

impl RedisTestContainer {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let redis_url = redis.redis_url().await.expect("redis url");

        // Give the server a moment after the readiness log line.
        tokio::time::sleep(Duration::from_millis(500)).await;

        Self {
            _redis: redis,
            redis_url,
        }
    }

    async fn create_connection(&self) -> redis::aio::MultiplexedConnection {
        let client = redis::Client::open(self.redis_url.as_str()).expect("redis client");
        client
            .get_multiplexed_async_connection()
            .await
            .expect("redis connection")
    }
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_basic_get_set() {
    let fixture = RedisTestContainer::start().await;
    let cache = RedisUrlCache::connect(&fixture.redis_url).await.unwrap();
    let code = ShortCode::new("test123").unwrap();

    assert!(cache.get_url(&code).await.unwrap().is_none());

    cache
        .set_url(&code, "https://example.com", TTL)
        .await
        .unwrap();

    assert_eq!(
        cache.get_url(&code).await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_sets_expiry_on_key() {
    let fixture = RedisTestContainer::start().await;
    let cache = RedisUrlCache::new(fixture.create_connection().await);
    let code = ShortCode::new("ttl123").unwrap();

    cache
        .set_url(&code, "https://example.com/ttl", TTL)
        .await
        .unwrap();

    let mut raw = fixture.create_connection().await;
    let ttl: i64 = raw.ttl("blink:url:ttl123").await.unwrap();
    assert!(ttl > 0 && ttl <= 60, "unexpected ttl {ttl}");
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_entry_expires() {
    let fixture = RedisTestContainer::start().await;
    let cache = RedisUrlCache::new(fixture.create_connection().await);
    let code = ShortCode::new("expiring").unwrap();

    cache
        .set_url(&code, "https://example.com", Duration::from_secs(1))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2_100)).await;

    assert!(cache.get_url(&code).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_overwrite() {
    let fixture = RedisTestContainer::start().await;
    let cache = RedisUrlCache::new(fixture.create_connection().await);
    let code = ShortCode::new("overwrite").unwrap();

    cache
        .set_url(&code, "https://example.com/old", TTL)
        .await
        .unwrap();
    cache
        .set_url(&code, "https://example.com/new", TTL)
        .await
        .unwrap();

    assert_eq!(
        cache.get_url(&code).await.unwrap().as_deref(),
        Some("https://example.com/new")
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_custom_prefix() {
    let fixture = RedisTestContainer::start().await;
    let cache1 = RedisUrlCache::with_prefix(fixture.create_connection().await, "prefix1:");
    let cache2 = RedisUrlCache::with_prefix(fixture.create_connection().await, "prefix2:");
    let code = ShortCode::new("prefix_test").unwrap();

    cache1
        .set_url(&code, "https://example.com/prefix", TTL)
        .await
        .unwrap();

    assert!(cache1.get_url(&code).await.unwrap().is_some());
    assert!(
        cache2.get_url(&code).await.unwrap().is_none(),
        "Different prefix should isolate caches"
    );
}

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use blink_cache::{LayeredCache, MokaUrlCache, NullCache, RedisUrlCache};
use blink_core::{Repository, UrlCache};
use blink_gateway::{App, AppState};
use blink_generator::RandomGenerator;
use blink_shortener::{ShortenerService, ShortenerSettings};
use blink_storage::{InMemoryRepository, MySqlRepository};
use blink_telemetry::TelemetryConfig;
use clap::Parser;
use tracing::info;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let _telemetry = blink_telemetry::init(
        TelemetryConfig::builder()
            .service_name("blink-gateway")
            .log_format(config.log_format.into())
            .otlp_endpoint_opt(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting blink gateway"
    );

    let cache_ttl = Duration::try_from(config.cache_ttl).context("cache TTL must be positive")?;
    let repository = open_repository(&config).await?;
    let cache = open_cache(&config).await?;

    let service = ShortenerService::new(
        repository,
        cache,
        RandomGenerator::with_length(usize::from(config.code_length))
            .context("invalid code length")?,
        ShortenerSettings::builder()
            .base_url(config.base_url.clone())
            .cache_ttl(cache_ttl)
            .build(),
    );

    let app = App::router(AppState::new(Arc::new(service)));
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn open_repository(config: &CLI) -> anyhow::Result<Arc<dyn Repository>> {
    let repository: Arc<dyn Repository> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(InMemoryRepository::new()),
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect_with(dsn, config.mysql_max_connections)
                .await
                .context("failed to connect to MySQL")?;
            repository.ensure_schema().await?;
            Arc::new(repository)
        }
    };
    Ok(repository)
}

async fn open_cache(config: &CLI) -> anyhow::Result<Arc<dyn UrlCache>> {
    let cache: Arc<dyn UrlCache> = match config.cache {
        CacheBackendArg::Moka => Arc::new(MokaUrlCache::new()),
        CacheBackendArg::Redis => Arc::new(connect_redis(config).await?),
        CacheBackendArg::Layered => {
            Arc::new(LayeredCache::new(MokaUrlCache::new(), connect_redis(config).await?))
        }
        CacheBackendArg::Disabled => Arc::new(NullCache::new()),
    };
    Ok(cache)
}

async fn connect_redis(config: &CLI) -> anyhow::Result<RedisUrlCache> {
    let url = config
        .redis_url
        .as_deref()
        .context("redis url is required for the redis and layered caches")?;
    RedisUrlCache::connect(url)
        .await
        .context("failed to connect to Redis")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

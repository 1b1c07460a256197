use async_trait::async_trait;
use blink_core::error::StorageError;
use blink_core::repository::{ReadRepository, Repository, Result, UrlRecord};
use blink_core::shortcode::ShortCode;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use tracing::{debug, trace};

/// Idempotent DDL for the `url_mappings` table.
pub const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// MySQL implementation of the repository contract.
///
/// Codes and slugs are stored with a binary collation so lookups are
/// case-sensitive. Rows are never deleted or updated apart from the click
/// counter.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with(database_url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Same as [`connect`](Self::connect) with an explicit pool size.
    pub async fn connect_with(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("url_mappings schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn record_from_row(row: &MySqlRow) -> Result<UrlRecord> {
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let click_count: u64 = row.try_get("click_count").map_err(map_sqlx_error)?;
    let custom_slug: Option<String> = row.try_get("custom_slug").map_err(map_sqlx_error)?;

    Ok(UrlRecord {
        short_code: ShortCode::new_unchecked(short_code),
        original_url,
        click_count,
        custom_slug,
    })
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        trace!(code = %code, "Looking up short code in MySQL");

        // One round trip over both unique indexes; a short_code match sorts
        // ahead of a custom_slug match.
        let row = sqlx::query(
            r#"
            SELECT short_code, original_url, click_count, custom_slug
            FROM url_mappings
            WHERE short_code = ? OR custom_slug = ?
            ORDER BY short_code = ? DESC
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .bind(code.as_str())
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn save(&self, record: &UrlRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (short_code, original_url, click_count, custom_slug)
            VALUES (?, ?, 0, ?)
            "#,
        )
        .bind(record.short_code.as_str())
        .bind(record.original_url.as_str())
        .bind(record.custom_slug.as_deref())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(code = %record.short_code, "Saved URL mapping to MySQL");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(record.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_click_count(&self, code: &ShortCode) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE url_mappings
            SET click_count = click_count + 1
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(code.to_string()));
        }

        trace!(code = %code, "Incremented click count in MySQL");
        Ok(())
    }
}

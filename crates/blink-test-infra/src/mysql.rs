use crate::{Result, TestInfraError};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;
const ROOT_PASSWORD: &str = "root";

#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "blink".to_string(), setter(into))]
    database: String,
    #[builder(default = "blink".to_string(), setter(into))]
    username: String,
    #[builder(default = "blink".to_string(), setter(into))]
    password: String,
    /// Connection attempts made by [`MySqlServer::connect`].
    #[builder(default = 20)]
    connect_attempts: usize,
    #[builder(default = Duration::from_millis(500))]
    connect_backoff: Duration,
}

/// Test fixture for a disposable MySQL server holding Blink's URL mappings.
///
/// The image logs "ready for connections" once during initialisation and
/// again when the real server is up, so the first pool may be refused.
/// [`MySqlServer::connect`] retries until the server accepts connections.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", "8.4")
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", ROOT_PASSWORD)
            .start()
            .await?;

        Ok(Self { container, config })
    }

    /// Builds a `mysql://` DSN for `database` with the application user.
    pub async fn dsn(&self, database: &str) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        Ok(format!(
            "mysql://{}:{}@{}:{}/{}",
            self.config.username, self.config.password, host, port, database
        ))
    }

    /// DSN of the database created at container start.
    pub async fn database_url(&self) -> Result<String> {
        self.dsn(&self.config.database).await
    }

    /// Opens a small pool on the configured database, retrying while the
    /// server finishes starting.
    pub async fn connect(&self) -> Result<MySqlPool> {
        let url = self.database_url().await?;
        let attempts = self.config.connect_attempts.max(1);
        let mut last_error = None;

        for _ in 0..attempts {
            match MySqlPoolOptions::new().max_connections(5).connect(&url).await {
                Ok(pool) => return Ok(pool),
                Err(err) => {
                    last_error = Some(err);
                    tokio::time::sleep(self.config.connect_backoff).await;
                }
            }
        }

        Err(TestInfraError::Unreachable {
            attempts,
            source: last_error.map(Box::new),
        })
    }
}

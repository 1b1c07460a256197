use blink_telemetry::LogFormat;
use clap::{Parser, ValueEnum};
use jiff::SignedDuration;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "BLINK_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "BLINK_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "BLINK_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "BLINK_MYSQL_DSN";
pub const MYSQL_MAX_CONNECTIONS_ENV: &str = "BLINK_MYSQL_MAX_CONNECTIONS";
pub const CACHE_BACKEND_ENV: &str = "BLINK_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "BLINK_REDIS_URL";
pub const CACHE_TTL_ENV: &str = "BLINK_CACHE_TTL";
pub const CODE_LENGTH_ENV: &str = "BLINK_CODE_LENGTH";
pub const LOG_FORMAT_ENV: &str = "BLINK_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "BLINK_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_CACHE_TTL: &str = "24h";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    Moka,
    Redis,
    /// Moka in front of Redis.
    Layered,
    #[value(name = "none")]
    Disabled,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
            CacheBackendArg::Layered => write!(f, "layered"),
            CacheBackendArg::Disabled => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "blink-gateway", about = "Blink URL shortener HTTP server")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public prefix of generated short links.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = MYSQL_MAX_CONNECTIONS_ENV, default_value_t = 10)]
    pub mysql_max_connections: u32,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(
        long,
        env = REDIS_URL_ENV,
        required_if_eq_any([("cache", "redis"), ("cache", "layered")])
    )]
    pub redis_url: Option<String>,

    /// How long resolved URLs stay cached, e.g. `24h` or `30m`.
    #[arg(
        long,
        env = CACHE_TTL_ENV,
        default_value = DEFAULT_CACHE_TTL,
        value_parser = parse_cache_ttl
    )]
    pub cache_ttl: SignedDuration,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(4..=16)
    )]
    pub code_length: u8,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// OTLP gRPC endpoint for span export; disabled when unset.
    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

/// A zero or negative TTL would make every cache write expire on arrival.
fn parse_cache_ttl(value: &str) -> Result<SignedDuration, String> {
    let ttl: SignedDuration = value.parse().map_err(|e| format!("{e}"))?;
    if !ttl.is_positive() {
        return Err(format!("cache TTL must be positive, got {value}"));
    }
    Ok(ttl)
}

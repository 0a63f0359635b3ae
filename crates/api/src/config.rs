use std::str::FromStr;

use absensi_core::datetime::offset_from_hours;
use chrono::FixedOffset;

use crate::auth::jwt::JwtConfig;

/// Which store backs the aggregated-result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Per-process map. Lost on restart, not shared between instances.
    Memory,
    /// The `aggregated_result_cache` table, shared by every instance.
    Postgres,
}

impl CacheBackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => Err(format!(
                "unknown result cache backend '{other}', expected 'memory' or 'postgres'"
            )),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    pub result_cache_backend: CacheBackendKind,
    /// Lifetime of a cached aggregated result in seconds (default: `3600`).
    pub result_cache_ttl_secs: u64,
    /// Offset applied to the date/time strings in form payloads (default: UTC+7).
    pub utc_offset: FixedOffset,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `RESULT_CACHE_BACKEND`  | `memory`                   |
    /// | `RESULT_CACHE_TTL_SECS` | `3600`                     |
    /// | `UTC_OFFSET_HOURS`      | `7`                        |
    ///
    /// See [`JwtConfig::from_env`] for the JWT variables.
    ///
    /// # Panics
    ///
    /// Panics on unparseable values, which is the desired behaviour at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let result_cache_backend: CacheBackendKind = std::env::var("RESULT_CACHE_BACKEND")
            .unwrap_or_else(|_| "memory".into())
            .parse()
            .unwrap_or_else(|e| panic!("RESULT_CACHE_BACKEND: {e}"));

        let result_cache_ttl_secs: u64 = std::env::var("RESULT_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("RESULT_CACHE_TTL_SECS must be a valid u64");

        let utc_offset_hours: i32 = std::env::var("UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| "7".into())
            .parse()
            .expect("UTC_OFFSET_HOURS must be a valid i32");
        let utc_offset = offset_from_hours(utc_offset_hours)
            .unwrap_or_else(|e| panic!("UTC_OFFSET_HOURS: {e}"));

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            result_cache_backend,
            result_cache_ttl_secs,
            utc_offset,
        }
    }
}

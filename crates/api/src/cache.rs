//! Runtime choice between the in-process and the Postgres result cache.

use std::time::Duration;

use absensi_core::attendance::ports::{CacheError, ResultCache};
use absensi_core::cache::InMemoryResultCache;
use absensi_db::{DbPool, PgResultCache};

use crate::config::{CacheBackendKind, ServerConfig};

/// The [`ResultCache`] selected by `RESULT_CACHE_BACKEND`.
pub enum ResultCacheBackend {
    Memory(InMemoryResultCache),
    Postgres(PgResultCache),
}

impl ResultCacheBackend {
    pub fn from_config(config: &ServerConfig, pool: DbPool) -> Self {
        match config.result_cache_backend {
            CacheBackendKind::Memory => Self::Memory(InMemoryResultCache::new()),
            CacheBackendKind::Postgres => Self::Postgres(PgResultCache::new(pool)),
        }
    }

    pub fn kind(&self) -> CacheBackendKind {
        match self {
            Self::Memory(_) => CacheBackendKind::Memory,
            Self::Postgres(_) => CacheBackendKind::Postgres,
        }
    }

    /// Drop expired entries. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        match self {
            Self::Memory(cache) => Ok(cache.purge_expired().await as u64),
            Self::Postgres(cache) => cache.purge_expired().await,
        }
    }
}

impl ResultCache for ResultCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Postgres(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.set(key, value, ttl).await,
            Self::Postgres(cache) => cache.set(key, value, ttl).await,
        }
    }
}

use std::time::Duration;

use absensi_core::attendance::ports::{CacheError, ResultCache};
use sqlx::PgPool;

use crate::repositories::ResultCacheRepo;

/// [`ResultCache`] stored in the `aggregated_result_cache` table, so every
/// API process shares one cache.
#[derive(Debug, Clone)]
pub struct PgResultCache {
    pool: PgPool,
}

impl PgResultCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drop expired rows. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        ResultCacheRepo::purge_expired(&self.pool)
            .await
            .map_err(|e| CacheError(e.to_string()))
    }
}

impl ResultCache for PgResultCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        ResultCacheRepo::find_live(&self.pool, key)
            .await
            .map_err(|e| CacheError(e.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| CacheError(e.to_string()))?;
        let expires_at = chrono::Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| CacheError("ttl overflows the clock".into()))?;
        ResultCacheRepo::upsert(&self.pool, key, &value, expires_at)
            .await
            .map_err(|e| CacheError(e.to_string()))
    }
}

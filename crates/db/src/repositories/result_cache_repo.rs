//! Repository for the `aggregated_result_cache` table.

use absensi_core::types::Timestamp;
use sqlx::PgPool;

/// Key/value access with expiry. Expired rows read as absent.
pub struct ResultCacheRepo;

impl ResultCacheRepo {
    /// Insert or overwrite an entry. Last write wins.
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        payload: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO aggregated_result_cache (cache_key, payload, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (cache_key) DO UPDATE SET
                payload = EXCLUDED.payload,
                expires_at = EXCLUDED.expires_at",
        )
        .bind(key)
        .bind(payload)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Payload of an unexpired entry.
    pub async fn find_live(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT payload FROM aggregated_result_cache
             WHERE cache_key = $1 AND expires_at > NOW()",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    /// Delete expired entries, returning how many were removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM aggregated_result_cache WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

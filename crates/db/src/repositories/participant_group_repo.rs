//! Repository for the `participant_groups` table.

use absensi_core::types::DbId;
use sqlx::PgPool;

use crate::models::participant_group::ParticipantGroup;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct ParticipantGroupRepo;

impl ParticipantGroupRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<ParticipantGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO participant_groups (name) VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParticipantGroup>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ParticipantGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participant_groups WHERE id = $1");
        sqlx::query_as::<_, ParticipantGroup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<ParticipantGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participant_groups ORDER BY name");
        sqlx::query_as::<_, ParticipantGroup>(&query)
            .fetch_all(pool)
            .await
    }
}

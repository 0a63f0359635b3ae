//! Repository for the `attendance_forms` table.

use absensi_core::attendance::model::{FormUpdate, NewAttendanceForm};
use absensi_core::status::AttendanceStatus;
use absensi_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendance_form::AttendanceFormRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, participant_group_id, start_at, finish_at, \
                       allow_update_by_attendee, created_by, updated_by, \
                       created_at, updated_at, deleted_at, deleted_by";

/// Matches rows that are not soft-deleted.
const LIVE: &str = "deleted_at IS NULL AND deleted_by IS NULL";

/// Provides CRUD operations for attendance forms.
pub struct AttendanceFormRepo;

impl AttendanceFormRepo {
    /// Insert a new form, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewAttendanceForm,
    ) -> Result<AttendanceFormRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_forms
                (title, participant_group_id, start_at, finish_at,
                 allow_update_by_attendee, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceFormRow>(&query)
            .bind(&input.title)
            .bind(input.participant_group_id)
            .bind(input.start_at)
            .bind(input.finish_at)
            .bind(input.allow_update_by_attendee)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a form by id, soft-deleted rows included.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AttendanceFormRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance_forms WHERE id = $1");
        sqlx::query_as::<_, AttendanceFormRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List live forms, newest first. A `None` limit returns every row.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<AttendanceFormRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_forms
             WHERE {LIVE}
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, AttendanceFormRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a live form's metadata unless a settled record exists.
    ///
    /// The settled check runs inside the same statement as the write.
    /// Returns `None` if no live, unlocked row with the given `id` exists;
    /// callers tell the two apart with [`Self::find_by_id`].
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &FormUpdate,
    ) -> Result<Option<AttendanceFormRow>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_forms SET
                title = $2,
                participant_group_id = $3,
                start_at = $4,
                finish_at = $5,
                allow_update_by_attendee = $6,
                updated_by = $7,
                updated_at = NOW()
             WHERE id = $1 AND {LIVE}
               AND NOT EXISTS (
                   SELECT 1 FROM attendance_records r
                   WHERE r.form_id = attendance_forms.id AND r.status <> $8
               )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceFormRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.participant_group_id)
            .bind(input.start_at)
            .bind(input.finish_at)
            .bind(input.allow_update_by_attendee)
            .bind(input.updated_by)
            .bind(AttendanceStatus::PendingPresent.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Mark a form as deleted. Returns `true` if a live row was updated.
    pub async fn soft_delete(pool: &PgPool, id: DbId, deleted_by: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_forms SET deleted_at = NOW(), deleted_by = $2
             WHERE id = $1 AND {LIVE}"
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(deleted_by)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

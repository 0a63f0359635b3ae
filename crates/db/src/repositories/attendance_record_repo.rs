//! Repository for the `attendance_records` table.

use absensi_core::attendance::model::NewAttendanceRecord;
use absensi_core::status::AttendanceStatus;
use absensi_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendance_record::{AttendanceRecordRow, ParticipantRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, form_id, member_id, status, reason, created_at, updated_at";

/// Provides data access for attendance records.
pub struct AttendanceRecordRepo;

impl AttendanceRecordRepo {
    /// Insert a record. A second record for the same `(form_id, member_id)`
    /// fails with a `uq_attendance_records_form_member` violation.
    pub async fn create(
        pool: &PgPool,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecordRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records (form_id, member_id, status, reason)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecordRow>(&query)
            .bind(input.form_id)
            .bind(input.member_id)
            .bind(input.status.as_str())
            .bind(&input.reason)
            .fetch_one(pool)
            .await
    }

    /// Find a record by id within a form.
    pub async fn find_by_id(
        pool: &PgPool,
        form_id: DbId,
        id: DbId,
    ) -> Result<Option<AttendanceRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE id = $1 AND form_id = $2"
        );
        sqlx::query_as::<_, AttendanceRecordRow>(&query)
            .bind(id)
            .bind(form_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the record a member created on a form.
    pub async fn find_by_member(
        pool: &PgPool,
        form_id: DbId,
        member_id: DbId,
    ) -> Result<Option<AttendanceRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE form_id = $1 AND member_id = $2"
        );
        sqlx::query_as::<_, AttendanceRecordRow>(&query)
            .bind(form_id)
            .bind(member_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a record's status and reason.
    ///
    /// Returns `None` if the row no longer exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: AttendanceStatus,
        reason: Option<&str>,
    ) -> Result<Option<AttendanceRecordRow>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_records SET
                status = $2,
                reason = $3,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecordRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// Whether any record on the form has moved past `PENDING_PRESENT`.
    pub async fn has_settled(pool: &PgPool, form_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM attendance_records
                WHERE form_id = $1 AND status <> $2
             )",
        )
        .bind(form_id)
        .bind(AttendanceStatus::PendingPresent.as_str())
        .fetch_one(pool)
        .await
    }

    /// Every record on a form joined with its member's name, oldest fill first.
    pub async fn list_participants(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<ParticipantRow>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantRow>(
            "SELECT r.member_id, u.name AS member_name, r.status, r.reason,
                    r.updated_at AS filled_at
             FROM attendance_records r
             JOIN users u ON u.id = r.member_id
             WHERE r.form_id = $1
             ORDER BY r.updated_at ASC, r.member_id ASC",
        )
        .bind(form_id)
        .fetch_all(pool)
        .await
    }
}

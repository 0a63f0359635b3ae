//! Attendance form row.

use absensi_core::attendance::model::AttendanceForm;
use absensi_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `attendance_forms` table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceFormRow {
    pub id: DbId,
    pub title: String,
    pub participant_group_id: DbId,
    pub start_at: Timestamp,
    pub finish_at: Timestamp,
    pub allow_update_by_attendee: bool,
    pub created_by: DbId,
    pub updated_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
    pub deleted_by: Option<DbId>,
}

impl From<AttendanceFormRow> for AttendanceForm {
    fn from(row: AttendanceFormRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            participant_group_id: row.participant_group_id,
            start_at: row.start_at,
            finish_at: row.finish_at,
            allow_update_by_attendee: row.allow_update_by_attendee,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            deleted_by: row.deleted_by,
        }
    }
}

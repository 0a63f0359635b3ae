//! Attendance record rows and the participant projection.
//!
//! `status` is stored as the canonical upper-case name and decoded with
//! [`parse_status`] on the way out; the table's check constraint keeps the
//! two in sync.

use absensi_core::attendance::model::{AttendanceRecord, Participant};
use absensi_core::error::CoreError;
use absensi_core::status::parse_status;
use absensi_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `attendance_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRecordRow {
    pub id: DbId,
    pub form_id: DbId,
    pub member_id: DbId,
    pub status: String,
    pub reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<AttendanceRecordRow> for AttendanceRecord {
    type Error = CoreError;

    fn try_from(row: AttendanceRecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            form_id: row.form_id,
            member_id: row.member_id,
            status: parse_status(&row.status)?,
            reason: row.reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A record joined with `users.name`.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub member_id: DbId,
    pub member_name: String,
    pub status: String,
    pub reason: Option<String>,
    pub filled_at: Timestamp,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = CoreError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            member_id: row.member_id,
            member_name: row.member_name,
            status: parse_status(&row.status)?,
            reason: row.reason,
            filled_at: row.filled_at,
        })
    }
}

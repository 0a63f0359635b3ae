//! Attendance forms, records, and the aggregated result read-model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::status::AttendanceStatus;
use crate::types::{DbId, Timestamp};

/// Prefix of every aggregated-result cache key.
pub const RESULT_CACHE_KEY_PREFIX: &str = "absent_result:form:";

/// One announced, time-bounded attendance event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceForm {
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

impl AttendanceForm {
    /// Soft-deleted forms have either marker set.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some() || self.deleted_by.is_some()
    }
}

/// Admin-supplied form fields, shared by creation and metadata updates.
#[derive(Debug, Clone, Validate)]
pub struct FormInput {
    #[validate(length(min = 5, max = 255, message = "title must be 5 to 255 characters"))]
    pub title: String,
    pub participant_group_id: DbId,
    pub start_at: Timestamp,
    pub finish_at: Timestamp,
    pub allow_update_by_attendee: bool,
}

/// Repository input for inserting a form.
#[derive(Debug, Clone)]
pub struct NewAttendanceForm {
    pub title: String,
    pub participant_group_id: DbId,
    pub start_at: Timestamp,
    pub finish_at: Timestamp,
    pub allow_update_by_attendee: bool,
    pub created_by: DbId,
}

/// Repository input for overwriting a form's metadata.
#[derive(Debug, Clone)]
pub struct FormUpdate {
    pub title: String,
    pub participant_group_id: DbId,
    pub start_at: Timestamp,
    pub finish_at: Timestamp,
    pub allow_update_by_attendee: bool,
    pub updated_by: DbId,
}

/// One member's declaration against one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub form_id: DbId,
    pub member_id: DbId,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Repository input for inserting a record.
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub form_id: DbId,
    pub member_id: DbId,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

/// A record joined with its member's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub member_id: DbId,
    pub member_name: String,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub filled_at: Timestamp,
}

/// Number of participants per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub present: u32,
    pub absent: u32,
    pub excused: u32,
    pub pending_present: u32,
    pub pending_excused: u32,
}

impl StatusSummary {
    pub fn tally(participants: &[Participant]) -> Self {
        participants
            .iter()
            .fold(Self::default(), |mut acc, participant| {
                match participant.status {
                    AttendanceStatus::Present => acc.present += 1,
                    AttendanceStatus::Absent => acc.absent += 1,
                    AttendanceStatus::Excused => acc.excused += 1,
                    AttendanceStatus::PendingPresent => acc.pending_present += 1,
                    AttendanceStatus::PendingExcused => acc.pending_excused += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.excused + self.pending_present + self.pending_excused
    }
}

/// Denormalized per-form view served from the result cache.
///
/// Not authoritative: always reconstructible from the form and its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub form_id: DbId,
    pub title: String,
    pub start_at: Timestamp,
    pub finish_at: Timestamp,
    pub participants: Vec<Participant>,
    pub summary: StatusSummary,
}

impl AggregatedResult {
    /// Assemble the view, ordering participants by fill time then member id.
    pub fn assemble(form: &AttendanceForm, mut participants: Vec<Participant>) -> Self {
        participants.sort_by(|a, b| {
            a.filled_at
                .cmp(&b.filled_at)
                .then_with(|| a.member_id.cmp(&b.member_id))
        });
        let summary = StatusSummary::tally(&participants);
        Self {
            form_id: form.id,
            title: form.title.clone(),
            start_at: form.start_at,
            finish_at: form.finish_at,
            participants,
            summary,
        }
    }

    /// Cache key for the form's result.
    pub fn cache_key(form_id: DbId) -> String {
        format!("{RESULT_CACHE_KEY_PREFIX}{form_id}")
    }
}

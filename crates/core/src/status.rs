//! Attendance status codec.
//!
//! Converts free-text status strings into [`AttendanceStatus`]. Matching is
//! case-insensitive and exact; there is no fallback value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// What a member declared on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
    PendingPresent,
    PendingExcused,
}

/// Every status, in display order.
pub const ALL_STATUSES: [AttendanceStatus; 5] = [
    AttendanceStatus::Present,
    AttendanceStatus::Absent,
    AttendanceStatus::Excused,
    AttendanceStatus::PendingPresent,
    AttendanceStatus::PendingExcused,
];

impl AttendanceStatus {
    /// Canonical upper-case name, as stored in the `attendance_records.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Absent => "ABSENT",
            Self::Excused => "EXCUSED",
            Self::PendingPresent => "PENDING_PRESENT",
            Self::PendingExcused => "PENDING_EXCUSED",
        }
    }

    /// `PENDING_PRESENT` is the unsettled default; everything else is settled.
    ///
    /// A form with at least one settled record can no longer have its
    /// metadata edited.
    pub fn is_settled(self) -> bool {
        self != Self::PendingPresent
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a raw status string.
///
/// Accepts the five canonical names in any letter case. Anything else,
/// including the empty string and surrounding whitespace, is a validation
/// error.
pub fn parse_status(raw: &str) -> Result<AttendanceStatus, CoreError> {
    ALL_STATUSES
        .iter()
        .copied()
        .find(|status| status.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid status '{raw}'. Must be one of: {}",
                ALL_STATUSES.map(AttendanceStatus::as_str).join(", ")
            ))
        })
}

//! Submission window policy.
//!
//! A form accepts submissions and attendee updates while `now` lies in the
//! half-open interval `[start_at, finish_at)` and the form is not
//! soft-deleted. All functions here are pure.

use crate::attendance::model::AttendanceForm;
use crate::error::CoreError;
use crate::types::Timestamp;

/// Why a form is or is not writable at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writability {
    Open,
    NotYetOpen,
    Closed,
    Deleted,
    /// Unset, empty, or inverted window. Never treated as "always open".
    InvalidWindow,
}

impl Writability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::NotYetOpen => "not_yet_open",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
            Self::InvalidWindow => "invalid_window",
        }
    }
}

/// A bound at or before the Unix epoch (`Timestamp::default()`) counts as unset.
pub fn is_unset(instant: Timestamp) -> bool {
    instant <= Timestamp::default()
}

/// Classify the form's state at `now`.
pub fn writability(form: &AttendanceForm, now: Timestamp) -> Writability {
    if form.is_deleted() {
        return Writability::Deleted;
    }
    if is_unset(form.start_at) || is_unset(form.finish_at) || form.start_at >= form.finish_at {
        return Writability::InvalidWindow;
    }
    if now < form.start_at {
        Writability::NotYetOpen
    } else if now >= form.finish_at {
        Writability::Closed
    } else {
        Writability::Open
    }
}

/// Whether the form accepts writes at `now`.
pub fn is_open(form: &AttendanceForm, now: Timestamp) -> bool {
    writability(form, now) == Writability::Open
}

/// Validate a window supplied for a new or edited form.
///
/// Both bounds must be set, `start < finish`, and `finish` must not already
/// be in the past.
pub fn validate_window(start: Timestamp, finish: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if is_unset(start) || is_unset(finish) {
        return Err(CoreError::Validation(
            "start and finish time must both be set".into(),
        ));
    }
    if start >= finish {
        return Err(CoreError::Validation(
            "start time must be before finish time".into(),
        ));
    }
    if finish < now {
        return Err(CoreError::Validation(
            "finish time must not be in the past".into(),
        ));
    }
    Ok(())
}

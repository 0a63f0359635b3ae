//! Persistence and cache ports consumed by the engine.
//!
//! Both traits are implemented by `absensi-db` for PostgreSQL, by
//! [`crate::cache::InMemoryResultCache`] for an in-process cache, and by
//! fakes in tests. Implementations own their internal concurrency safety.

use std::future::Future;
use std::time::Duration;

use crate::attendance::model::{
    AttendanceForm, AttendanceRecord, FormUpdate, NewAttendanceForm, NewAttendanceRecord,
    Participant,
};
use crate::types::DbId;

/// Failure reported by an [`AttendanceRepository`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The row to modify no longer exists.
    #[error("row not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The form has settled records, so its metadata is frozen.
    #[error("form metadata is locked")]
    Locked,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Failure reported by a [`ResultCache`]. Never fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cache error: {0}")]
pub struct CacheError(pub String);

/// Authoritative storage for forms and records.
///
/// `create_record` must enforce uniqueness of `(form_id, member_id)` itself
/// and report a duplicate as [`RepositoryError::Conflict`].
pub trait AttendanceRepository: Send + Sync {
    /// Find a form by id, soft-deleted forms included.
    fn find_form(
        &self,
        form_id: DbId,
    ) -> impl Future<Output = Result<Option<AttendanceForm>, RepositoryError>> + Send;

    /// List non-deleted forms, newest first. `limit = None` returns all.
    fn list_forms(
        &self,
        limit: Option<i64>,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<AttendanceForm>, RepositoryError>> + Send;

    fn create_form(
        &self,
        input: &NewAttendanceForm,
    ) -> impl Future<Output = Result<AttendanceForm, RepositoryError>> + Send;

    /// Overwrite a non-deleted form's metadata. `None` if no such form.
    ///
    /// Must refuse with [`RepositoryError::Locked`] when a settled record
    /// exists at the moment of the write, not just at an earlier check.
    fn update_form(
        &self,
        form_id: DbId,
        input: &FormUpdate,
    ) -> impl Future<Output = Result<Option<AttendanceForm>, RepositoryError>> + Send;

    /// Whether any record on the form carries a settled status.
    fn has_settled_records(
        &self,
        form_id: DbId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Find a record by id, scoped to its form.
    fn find_record(
        &self,
        form_id: DbId,
        record_id: DbId,
    ) -> impl Future<Output = Result<Option<AttendanceRecord>, RepositoryError>> + Send;

    /// Find the record a member created on a form, if any.
    fn find_record_by_member(
        &self,
        form_id: DbId,
        member_id: DbId,
    ) -> impl Future<Output = Result<Option<AttendanceRecord>, RepositoryError>> + Send;

    fn create_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> impl Future<Output = Result<AttendanceRecord, RepositoryError>> + Send;

    /// Persist a record's status and reason.
    fn update_record(
        &self,
        record: &AttendanceRecord,
    ) -> impl Future<Output = Result<AttendanceRecord, RepositoryError>> + Send;

    /// Every record on the form joined with its member's name.
    fn list_participants(
        &self,
        form_id: DbId,
    ) -> impl Future<Output = Result<Vec<Participant>, RepositoryError>> + Send;
}

/// Key/value store holding serialized aggregated results.
pub trait ResultCache: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    /// Store `value` under `key` for `ttl`, replacing any previous value.
    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}

use absensi_core::attendance::model::{
    AttendanceForm, AttendanceRecord, FormUpdate, NewAttendanceForm, NewAttendanceRecord,
    Participant,
};
use absensi_core::attendance::ports::{AttendanceRepository, RepositoryError};
use absensi_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::{AttendanceFormRepo, AttendanceRecordRepo};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Translate a sqlx error into the port's error type.
///
/// Unique violations on `uq_*` constraints become
/// [`RepositoryError::Conflict`] carrying the constraint name.
pub fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            match db_err.constraint() {
                Some(constraint) if constraint.starts_with("uq_") => {
                    RepositoryError::Conflict(constraint.to_string())
                }
                _ => RepositoryError::Backend(err.to_string()),
            }
        }
        _ => RepositoryError::Backend(err.to_string()),
    }
}

fn decode_error(err: absensi_core::error::CoreError) -> RepositoryError {
    tracing::error!(error = %err, "Stored attendance row failed to decode");
    RepositoryError::Backend(format!("undecodable row: {err}"))
}

/// [`AttendanceRepository`] backed by the `attendance_forms` and
/// `attendance_records` tables.
#[derive(Debug, Clone)]
pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl AttendanceRepository for PgAttendanceRepository {
    async fn find_form(&self, form_id: DbId) -> Result<Option<AttendanceForm>, RepositoryError> {
        let row = AttendanceFormRepo::find_by_id(&self.pool, form_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(AttendanceForm::from))
    }

    async fn list_forms(
        &self,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<AttendanceForm>, RepositoryError> {
        let rows = AttendanceFormRepo::list(&self.pool, limit, offset)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(AttendanceForm::from).collect())
    }

    async fn create_form(&self, input: &NewAttendanceForm) -> Result<AttendanceForm, RepositoryError> {
        AttendanceFormRepo::create(&self.pool, input)
            .await
            .map(AttendanceForm::from)
            .map_err(map_sqlx_error)
    }

    async fn update_form(
        &self,
        form_id: DbId,
        input: &FormUpdate,
    ) -> Result<Option<AttendanceForm>, RepositoryError> {
        let updated = AttendanceFormRepo::update(&self.pool, form_id, input)
            .await
            .map_err(map_sqlx_error)?;
        if let Some(row) = updated {
            return Ok(Some(AttendanceForm::from(row)));
        }

        // Nothing matched: either the form is gone or a settled record froze it.
        let current = AttendanceFormRepo::find_by_id(&self.pool, form_id)
            .await
            .map_err(map_sqlx_error)?;
        match current {
            Some(row) if row.deleted_at.is_none() && row.deleted_by.is_none() => {
                Err(RepositoryError::Locked)
            }
            _ => Ok(None),
        }
    }

    async fn has_settled_records(&self, form_id: DbId) -> Result<bool, RepositoryError> {
        AttendanceRecordRepo::has_settled(&self.pool, form_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_record(
        &self,
        form_id: DbId,
        record_id: DbId,
    ) -> Result<Option<AttendanceRecord>, RepositoryError> {
        AttendanceRecordRepo::find_by_id(&self.pool, form_id, record_id)
            .await
            .map_err(map_sqlx_error)?
            .map(AttendanceRecord::try_from)
            .transpose()
            .map_err(decode_error)
    }

    async fn find_record_by_member(
        &self,
        form_id: DbId,
        member_id: DbId,
    ) -> Result<Option<AttendanceRecord>, RepositoryError> {
        AttendanceRecordRepo::find_by_member(&self.pool, form_id, member_id)
            .await
            .map_err(map_sqlx_error)?
            .map(AttendanceRecord::try_from)
            .transpose()
            .map_err(decode_error)
    }

    async fn create_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, RepositoryError> {
        let row = AttendanceRecordRepo::create(&self.pool, input)
            .await
            .map_err(map_sqlx_error)?;
        AttendanceRecord::try_from(row).map_err(decode_error)
    }

    async fn update_record(
        &self,
        record: &AttendanceRecord,
    ) -> Result<AttendanceRecord, RepositoryError> {
        let row = AttendanceRecordRepo::update_status(
            &self.pool,
            record.id,
            record.status,
            record.reason.as_deref(),
        )
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepositoryError::NotFound)?;
        AttendanceRecord::try_from(row).map_err(decode_error)
    }

    async fn list_participants(&self, form_id: DbId) -> Result<Vec<Participant>, RepositoryError> {
        AttendanceRecordRepo::list_participants(&self.pool, form_id)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(Participant::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_error)
    }
}

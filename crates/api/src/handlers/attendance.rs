//! Handlers for the `/absent/forms` resource and its records.

use absensi_core::attendance::{AggregatedResult, AttendanceForm, AttendanceRecord, FormInput};
use absensi_core::datetime::parse_date_and_time;
use absensi_core::error::CoreError;
use absensi_core::rbac::{Action, Resource};
use absensi_core::types::DbId;
use absensi_db::repositories::ParticipantGroupRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::FixedOffset;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /absent/forms` and `PUT /absent/forms/{id}`.
///
/// Dates are `YYYY-MM-DD` and times `HH:MM`, both in the configured local offset.
#[derive(Debug, Deserialize)]
pub struct FormRequest {
    pub title: String,
    pub participant_group_id: DbId,
    pub start_at_date: String,
    pub start_at_time: String,
    pub finished_at_date: String,
    pub finished_at_time: String,
    #[serde(default)]
    pub allow_update_by_attendee: bool,
}

impl FormRequest {
    fn into_input(self, offset: FixedOffset) -> Result<FormInput, CoreError> {
        let start_at = parse_date_and_time(&self.start_at_date, &self.start_at_time, offset)?;
        let finish_at =
            parse_date_and_time(&self.finished_at_date, &self.finished_at_time, offset)?;
        Ok(FormInput {
            title: self.title,
            participant_group_id: self.participant_group_id,
            start_at,
            finish_at,
            allow_update_by_attendee: self.allow_update_by_attendee,
        })
    }
}

/// Body of `POST /absent/forms/{id}/records` and `PATCH .../records/{record_id}`.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub status: String,
    pub reason: Option<String>,
}

async fn ensure_group_exists(state: &AppState, group_id: DbId) -> AppResult<()> {
    ParticipantGroupRepo::find_by_id(&state.pool, group_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ParticipantGroup",
            id: group_id,
        }))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// GET /api/v1/absent/forms
pub async fn list_forms(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<AttendanceForm>>>> {
    let forms = state
        .engine
        .list_forms(&auth.principal(), params.limit(), params.offset())
        .await?;
    Ok(Json(DataResponse { data: forms }))
}

/// POST /api/v1/absent/forms
pub async fn create_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<FormRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AttendanceForm>>)> {
    // Capability first: parse errors and group lookups must not leak to members.
    state
        .engine
        .authorize(&auth.principal(), Resource::AbsentForm, Action::CreateAny)?;
    let input = body.into_input(state.config.utc_offset)?;
    ensure_group_exists(&state, input.participant_group_id).await?;

    let form = state.engine.create_form(&auth.principal(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: form })))
}

/// GET /api/v1/absent/forms/{id}
pub async fn get_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AttendanceForm>>> {
    let form = state.engine.get_form(&auth.principal(), id).await?;
    Ok(Json(DataResponse { data: form }))
}

/// PUT /api/v1/absent/forms/{id}
pub async fn update_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<FormRequest>,
) -> AppResult<Json<DataResponse<AttendanceForm>>> {
    state
        .engine
        .authorize(&auth.principal(), Resource::AbsentForm, Action::UpdateAny)?;
    let input = body.into_input(state.config.utc_offset)?;
    ensure_group_exists(&state, input.participant_group_id).await?;

    let form = state
        .engine
        .update_form_metadata(&auth.principal(), id, input)
        .await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/absent/forms/{id}/result
pub async fn get_result(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AggregatedResult>>> {
    let result = state.engine.get_aggregated_result(id).await?;
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// POST /api/v1/absent/forms/{id}/records
pub async fn submit_record(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    Json(body): Json<RecordRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AttendanceRecord>>)> {
    let record = state
        .engine
        .submit_record(&auth.principal(), form_id, &body.status, body.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// PATCH /api/v1/absent/forms/{id}/records/{record_id}
pub async fn update_record(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((form_id, record_id)): Path<(DbId, DbId)>,
    Json(body): Json<RecordRequest>,
) -> AppResult<Json<DataResponse<AttendanceRecord>>> {
    let record = state
        .engine
        .update_record_by_owner(&auth.principal(), form_id, record_id, &body.status, body.reason)
        .await?;
    Ok(Json(DataResponse { data: record }))
}

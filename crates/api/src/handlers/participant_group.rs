//! Handlers for the `/participant-groups` resource.

use absensi_core::error::CoreError;
use absensi_db::models::participant_group::ParticipantGroup;
use absensi_db::repositories::ParticipantGroupRepo;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
}

/// GET /api/v1/participant-groups
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ParticipantGroup>>>> {
    let groups = ParticipantGroupRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// POST /api/v1/participant-groups
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ParticipantGroup>>)> {
    input.name = input.name.trim().to_string();
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let group = ParticipantGroupRepo::create(&state.pool, &input.name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}

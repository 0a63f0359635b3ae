//! Route definitions for attendance forms and records.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/absent/forms`.
///
/// ```text
/// GET    /                               -> list_forms
/// POST   /                               -> create_form
/// GET    /{id}                           -> get_form
/// PUT    /{id}                           -> update_form
/// GET    /{id}/result                    -> get_result
/// POST   /{id}/records                   -> submit_record
/// PATCH  /{id}/records/{record_id}       -> update_record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(attendance::list_forms).post(attendance::create_form),
        )
        .route(
            "/{id}",
            get(attendance::get_form).put(attendance::update_form),
        )
        .route("/{id}/result", get(attendance::get_result))
        .route("/{id}/records", post(attendance::submit_record))
        .route(
            "/{id}/records/{record_id}",
            patch(attendance::update_record),
        )
}

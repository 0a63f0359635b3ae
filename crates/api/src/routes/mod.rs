pub mod attendance;
pub mod auth;
pub mod health;
pub mod participant_group;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                                  login (public)
///
/// /absent/forms                                list, create
/// /absent/forms/{id}                           get, update
/// /absent/forms/{id}/result                    aggregated result (admin)
/// /absent/forms/{id}/records                   submit own record
/// /absent/forms/{id}/records/{record_id}       update own record
///
/// /participant-groups                          list, create (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/absent/forms", attendance::router())
        .nest("/participant-groups", participant_group::router())
}

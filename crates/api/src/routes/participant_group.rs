use axum::routing::get;
use axum::Router;

use crate::handlers::participant_group;
use crate::state::AppState;

/// Routes mounted at `/participant-groups`.
///
/// ```text
/// GET    /    -> list
/// POST   /    -> create (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(participant_group::list).post(participant_group::create),
    )
}

//! HTTP-level integration tests for attendance forms and records.
//!
//! Every request goes through the production router and middleware stack,
//! against a freshly migrated database.

mod common;

use absensi_core::attendance::model::NewAttendanceForm;
use absensi_core::types::DbId;
use absensi_db::repositories::AttendanceFormRepo;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_group, create_user, form_body, get_auth, patch_json_auth,
    post_json_auth, put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

struct Seed {
    admin_token: String,
    admin_id: DbId,
    member_token: String,
    member_id: DbId,
    group_id: DbId,
}

async fn seed(pool: &PgPool) -> Seed {
    let (admin, admin_token) = create_user(pool, "Admin", "admin").await;
    let (member, member_token) = create_user(pool, "Budi", "member").await;
    let group_id = create_group(pool, "Board members").await;
    Seed {
        admin_token,
        admin_id: admin.id,
        member_token,
        member_id: member.id,
        group_id,
    }
}

/// Create a form open from an hour ago to two hours from now; returns its id.
async fn create_open_form(pool: &PgPool, seed: &Seed) -> DbId {
    let now = Utc::now();
    let body = form_body(
        "Weekly board meeting",
        seed.group_id,
        now - Duration::hours(1),
        now + Duration::hours(2),
    );
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/absent/forms",
        body,
        &seed.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

fn records_uri(form_id: DbId) -> String {
    format!("/api/v1/absent/forms/{form_id}/records")
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_and_lists_forms(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/absent/forms",
        &seed.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let forms = json["data"].as_array().unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["id"], form_id);
    assert_eq!(forms[0]["title"], "Weekly board meeting");
    assert_eq!(forms[0]["created_by"], seed.admin_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_can_read_a_form_but_not_list_or_create(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/absent/forms/{form_id}"),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/absent/forms",
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let now = Utc::now();
    let body = form_body("Member meeting", seed.group_id, now, now + Duration::hours(1));
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/absent/forms",
        body,
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "action is forbidden");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_form_dates_are_rejected(pool: PgPool) {
    let seed = seed(&pool).await;
    let body = json!({
        "title": "Weekly board meeting",
        "participant_group_id": seed.group_id,
        "start_at_date": "01/03/2024",
        "start_at_time": "08:00",
        "finished_at_date": "2024-03-01",
        "finished_at_time": "10:00",
    });

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/absent/forms",
        body,
        &seed.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn form_for_unknown_group_is_not_found(pool: PgPool) {
    let seed = seed(&pool).await;
    let now = Utc::now();
    let body = form_body("Weekly board meeting", 9999, now, now + Duration::hours(1));

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/absent/forms",
        body,
        &seed.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_form_writes_are_forbidden_before_any_validation(pool: PgPool) {
    let seed = seed(&pool).await;
    let now = Utc::now();
    let unknown_group = form_body("Weekly board meeting", 9999, now, now + Duration::hours(1));
    let bad_date = json!({
        "title": "Weekly board meeting",
        "participant_group_id": seed.group_id,
        "start_at_date": "bad",
        "start_at_time": "08:00",
        "finished_at_date": "2024-03-01",
        "finished_at_time": "10:00",
    });

    for body in [unknown_group.clone(), bad_date] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/absent/forms",
            body,
            &seed.member_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"], "action is forbidden");
    }

    let response = put_json_auth(
        common::build_test_app(pool),
        "/api/v1/absent/forms/424242",
        unknown_group,
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "action is forbidden");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settled_record_locks_form_metadata(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;
    let now = Utc::now();
    let edit = form_body(
        "Weekly board meeting (moved)",
        seed.group_id,
        now - Duration::hours(1),
        now + Duration::hours(3),
    );

    // No records yet: editable.
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/absent/forms/{form_id}"),
        edit.clone(),
        &seed.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["title"],
        "Weekly board meeting (moved)"
    );

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &records_uri(form_id),
        json!({ "status": "PRESENT" }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/absent/forms/{form_id}"),
        edit,
        &seed.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_form_is_hidden(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;
    assert!(AttendanceFormRepo::soft_delete(&pool, form_id, seed.admin_id)
        .await
        .unwrap());

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/absent/forms/{form_id}"),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        common::build_test_app(pool),
        &records_uri(form_id),
        json!({ "status": "PRESENT" }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_submits_once(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &records_uri(form_id),
        json!({ "status": "excused", "reason": "  family event  " }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "EXCUSED");
    assert_eq!(json["data"]["reason"], "family event");
    assert_eq!(json["data"]["member_id"], seed.member_id);

    let response = post_json_auth(
        common::build_test_app(pool),
        &records_uri(form_id),
        json!({ "status": "PRESENT" }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_EXISTS");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_status_is_rejected(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &records_uri(form_id),
        json!({ "status": "maybe" }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn closed_form_refuses_submissions(pool: PgPool) {
    let seed = seed(&pool).await;
    let now = Utc::now();
    let closed = AttendanceFormRepo::create(
        &pool,
        &NewAttendanceForm {
            title: "Last week's meeting".into(),
            participant_group_id: seed.group_id,
            start_at: now - Duration::days(7),
            finish_at: now - Duration::days(7) + Duration::hours(2),
            allow_update_by_attendee: true,
            created_by: seed.admin_id,
        },
    )
    .await
    .unwrap();

    let response = post_json_auth(
        common::build_test_app(pool),
        &records_uri(closed.id),
        json!({ "status": "PRESENT" }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "action is forbidden");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_owner_updates_a_record(pool: PgPool) {
    let seed = seed(&pool).await;
    let (_, other_token) = create_user(&pool, "Citra", "member").await;
    let form_id = create_open_form(&pool, &seed).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &records_uri(form_id),
        json!({ "status": "PENDING_PRESENT" }),
        &seed.member_token,
    )
    .await;
    let record_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("{}/{record_id}", records_uri(form_id));

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "status": "ABSENT" }),
        &other_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(
        common::build_test_app(pool),
        &uri,
        json!({ "status": "pending_excused", "reason": "flight delayed" }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "PENDING_EXCUSED");
    assert_eq!(json["data"]["reason"], "flight delayed");
}

// ---------------------------------------------------------------------------
// Aggregated result
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn result_reflects_latest_submission(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;
    // One app, so the in-memory result cache is shared across requests.
    let app = common::build_test_app(pool);
    let result_uri = format!("/api/v1/absent/forms/{form_id}/result");

    let response = get_auth(app.clone(), &result_uri, &seed.admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["participants"].as_array().unwrap().len(), 0);

    let response = post_json_auth(
        app.clone(),
        &records_uri(form_id),
        json!({ "status": "PRESENT" }),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app, &result_uri, &seed.admin_token).await;
    let json = body_json(response).await;
    let participants = json["data"]["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["member_name"], "Budi");
    assert_eq!(participants[0]["status"], "PRESENT");
    assert_eq!(json["data"]["summary"]["present"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn result_is_admin_only(pool: PgPool) {
    let seed = seed(&pool).await;
    let form_id = create_open_form(&pool, &seed).await;

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/absent/forms/{form_id}/result"),
        &seed.member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn result_for_unknown_form_is_not_found(pool: PgPool) {
    let seed = seed(&pool).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/absent/forms/4242/result",
        &seed.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

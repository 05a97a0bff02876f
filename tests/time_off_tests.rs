use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

mod common;

use common::{TestAssertions, TestContext};

fn vacation_request() -> Value {
    json!({
        "type": "vacation",
        "startDate": "2024-06-04",
        "endDate": "2024-06-05",
        "reason": "Family trip"
    })
}

#[actix_web::test]
async fn test_create_request_notifies_admins() {
    let ctx = TestContext::new().await;
    let (maria, maria_token) = ctx.employee("maria", "Maria Lopez").await;
    let app = common::init_app!(ctx);

    let req = common::post("/api/time-off-requests", &maria_token, vacation_request()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let request = TestAssertions::assert_success(&body);
    assert_eq!(request["userId"], maria.id);
    assert_eq!(request["status"], "pending");
    assert_eq!(request["duration"], "full_day");

    let notifications = ctx
        .state
        .repositories
        .notifications
        .list_for_user(ctx.admin.id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "New time-off request from Maria Lopez");
    assert_eq!(notifications[0].data["requestId"], request["id"]);
}

#[actix_web::test]
async fn test_create_request_rejects_inverted_range() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.employee("maria", "Maria Lopez").await;
    let app = common::init_app!(ctx);

    let req = common::post(
        "/api/time-off-requests",
        &token,
        json!({ "type": "sick", "startDate": "2024-06-05", "endDate": "2024-06-04" }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_approve_request_notifies_owner() {
    let ctx = TestContext::new().await;
    let (maria, maria_token) = ctx.employee("maria", "Maria Lopez").await;
    let app = common::init_app!(ctx);

    let req = common::post("/api/time-off-requests", &maria_token, vacation_request()).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = TestAssertions::assert_success(&body)["id"].as_i64().unwrap();

    // Employees cannot decide
    let uri = format!("/api/time-off-requests/{}/approve", id);
    let req = common::post(&uri, &maria_token, json!({})).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = common::post(&uri, &ctx.admin_token, json!({})).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let decided = TestAssertions::assert_success(&body);
    assert_eq!(decided["status"], "approved");
    assert_eq!(decided["approvedBy"], ctx.admin.id);

    let notifications = ctx
        .state
        .repositories
        .notifications
        .list_for_user(maria.id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "Your time-off request has been approved");
    assert_eq!(notifications[0].notification_type.as_str(), "request_approved");
}

#[actix_web::test]
async fn test_reject_unknown_request() {
    let ctx = TestContext::new().await;
    let app = common::init_app!(ctx);

    let req = common::post("/api/time-off-requests/99/reject", &ctx.admin_token, json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_listing_by_role_and_status() {
    let ctx = TestContext::new().await;
    let (_, maria_token) = ctx.employee("maria", "Maria Lopez").await;
    let (_, luis_token) = ctx.employee("luis", "Luis Perez").await;
    let app = common::init_app!(ctx);

    let mut ids = Vec::new();
    for token in [&maria_token, &luis_token] {
        let req = common::post("/api/time-off-requests", token, vacation_request()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(TestAssertions::assert_success(&body)["id"].as_i64().unwrap());
    }

    let req = common::post(
        &format!("/api/time-off-requests/{}/reject", ids[0]),
        &ctx.admin_token,
        json!({}),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Admins default to the pending queue
    let req = common::get("/api/time-off-requests", &ctx.admin_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let pending = TestAssertions::assert_success(&body);
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
    assert_eq!(pending[0]["id"], ids[1]);

    let req = common::get("/api/time-off-requests?status=all", &ctx.admin_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(TestAssertions::assert_success(&body).as_array().map(Vec::len), Some(2));

    let req = common::get("/api/time-off-requests?status=rejected", &ctx.admin_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let rejected = TestAssertions::assert_success(&body);
    assert_eq!(rejected[0]["id"], ids[0]);

    // Employees see all of their own, whatever the status
    let req = common::get("/api/time-off-requests", &maria_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let own = TestAssertions::assert_success(&body);
    assert_eq!(own.as_array().map(Vec::len), Some(1));
    assert_eq!(own[0]["status"], "rejected");

    let req = common::get("/api/time-off-requests?status=bogus", &ctx.admin_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_approved_time_off_shapes_generation() {
    let ctx = TestContext::new().await;
    let (maria, maria_token) = ctx.employee("maria", "Maria Lopez").await;
    let app = common::init_app!(ctx);

    let req = common::post(
        "/api/time-off-requests",
        &maria_token,
        json!({ "type": "personal", "startDate": "2024-06-03", "endDate": "2024-06-07" }),
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = TestAssertions::assert_success(&body)["id"].as_i64().unwrap();

    let req = common::post(
        &format!("/api/time-off-requests/{}/approve", id),
        &ctx.admin_token,
        json!({}),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = common::post(
        "/api/schedules/preview",
        &ctx.admin_token,
        json!({ "startDate": "2024-06-03", "endDate": "2024-06-09" }),
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let data = TestAssertions::assert_success(&body);
    let shifts = data["shifts"].as_array().cloned().unwrap_or_default();

    // Only the weekend is left
    assert_eq!(shifts.len(), 2);
    assert!(shifts.iter().all(|s| s["userId"] == maria.id));
    assert_eq!(shifts[0]["day"], "saturday");
    assert_eq!(shifts[1]["day"], "sunday");
}

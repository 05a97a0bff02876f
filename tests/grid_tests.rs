use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use staffsync::database::models::{
    NewTimeOffRequest, TimeOffDuration, TimeOffStatus, TimeOffType,
};

mod common;

use common::{TestAssertions, TestContext};

/// 08:00 on the grid.
const EIGHT_AM: usize = 8;

#[actix_web::test]
async fn test_shift_round_trip() {
    let ctx = TestContext::new().await;
    let (maria, maria_token) = ctx.employee("maria", "Maria Lopez").await;
    let (luis, _) = ctx.employee("luis", "Luis Perez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    for user_id in [maria.id, luis.id] {
        let req = common::post(
            "/api/shifts",
            &ctx.admin_token,
            json!({
                "scheduleId": schedule_id,
                "userId": user_id,
                "day": "monday",
                "startTime": "08:00",
                "endTime": "12:00",
                "type": "work",
                "notes": "Front desk",
                "area": null
            }),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let uri = format!("/api/schedules/{}/shifts", schedule_id);
    let req = common::get(&uri, &ctx.admin_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let shifts = TestAssertions::assert_success(&body);
    assert_eq!(shifts.as_array().map(Vec::len), Some(2));
    assert_eq!(shifts[0]["startTime"], "08:00");
    assert_eq!(shifts[0]["notes"], "Front desk");

    // Employees only see their own shifts
    let req = common::get(&uri, &maria_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let own = TestAssertions::assert_success(&body);
    assert_eq!(own.as_array().map(Vec::len), Some(1));
    assert_eq!(own[0]["userId"], maria.id);

    // No notifications while the schedule is a draft
    let notifications = ctx
        .state
        .repositories
        .notifications
        .list_for_user(maria.id)
        .await
        .unwrap();
    assert!(notifications.is_empty());
}

#[actix_web::test]
async fn test_shift_validation() {
    let ctx = TestContext::new().await;
    let (maria, _) = ctx.employee("maria", "Maria Lopez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    let req = common::post(
        "/api/shifts",
        &ctx.admin_token,
        json!({
            "scheduleId": schedule_id,
            "userId": maria.id,
            "day": "monday",
            "startTime": "12:00",
            "endTime": "08:00",
            "type": "work",
            "notes": null,
            "area": null
        }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = common::post(
        "/api/shifts",
        &ctx.admin_token,
        json!({
            "scheduleId": schedule_id + 1,
            "userId": maria.id,
            "day": "monday",
            "startTime": "08:00",
            "endTime": "12:00",
            "type": "work",
            "notes": null,
            "area": null
        }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_shift_change_on_published_schedule_notifies_owner() {
    let ctx = TestContext::new().await;
    let (maria, _) = ctx.employee("maria", "Maria Lopez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    ctx.state
        .repositories
        .schedules
        .mark_published(schedule_id)
        .await
        .unwrap();
    let app = common::init_app!(ctx);

    let req = common::post(
        "/api/shifts",
        &ctx.admin_token,
        json!({
            "scheduleId": schedule_id,
            "userId": maria.id,
            "day": "tuesday",
            "startTime": "09:00",
            "endTime": "17:00",
            "type": "regular",
            "notes": null,
            "area": null
        }),
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let shift_id = TestAssertions::assert_success(&body)["id"].as_i64().unwrap();

    let req = common::patch(
        &format!("/api/shifts/{}", shift_id),
        &ctx.admin_token,
        json!({ "endTime": "15:00" }),
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(TestAssertions::assert_success(&body)["endTime"], "15:00");

    let notifications = ctx
        .state
        .repositories
        .notifications
        .list_for_user(maria.id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 2);
    assert!(
        notifications
            .iter()
            .all(|n| n.message == "Your work schedule has been updated")
    );

    let req = common::delete(&format!("/api/shifts/{}", shift_id), &ctx.admin_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = common::delete(&format!("/api/shifts/{}", shift_id), &ctx.admin_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_click_cycle_returns_to_empty() {
    let ctx = TestContext::new().await;
    let (maria, _) = ctx.employee("maria", "Maria Lopez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    let uri = format!("/api/schedules/{}/grid/click", schedule_id);
    let click = json!({ "userId": maria.id, "date": "2024-06-04", "slot": EIGHT_AM });

    let expected = [
        ("created", json!("work"), 0.5),
        ("updated", json!("vacation"), 0.0),
        ("updated", json!("leave"), 0.0),
        ("deleted", Value::Null, 0.0),
    ];
    for (action, cell_type, total) in expected {
        let req = common::post(&uri, &ctx.admin_token, click.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let data = TestAssertions::assert_success(&body);
        assert_eq!(data["action"], action);
        assert_eq!(data["row"]["cells"][EIGHT_AM]["type"], cell_type);
        assert_eq!(data["row"]["total"], total);
    }

    let shifts = ctx
        .state
        .repositories
        .shifts
        .list_by_schedule(schedule_id)
        .await
        .unwrap();
    assert!(shifts.is_empty());
}

#[actix_web::test]
async fn test_four_clicks_restore_generated_shift() {
    let ctx = TestContext::new().await;
    let (maria, _) = ctx.employee("maria", "Maria Lopez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    let req = common::post(
        "/api/shifts",
        &ctx.admin_token,
        json!({
            "scheduleId": schedule_id,
            "userId": maria.id,
            "day": "monday",
            "startTime": "08:00",
            "endTime": "16:00",
            "type": "regular",
            "notes": null,
            "area": null
        }),
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let shift_id = TestAssertions::assert_success(&body)["id"].clone();

    // 09:00, inside the shift
    let slot = 10;
    let uri = format!("/api/schedules/{}/grid/click", schedule_id);
    let click = json!({ "userId": maria.id, "date": "2024-06-03", "slot": slot });

    let expected = [
        ("updated", json!("vacation"), 7.5),
        ("updated", json!("leave"), 7.5),
        ("deleted", Value::Null, 7.5),
        ("created", json!("regular"), 8.0),
    ];
    for (action, cell_type, total) in expected {
        let req = common::post(&uri, &ctx.admin_token, click.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let data = TestAssertions::assert_success(&body);
        assert_eq!(data["action"], action);
        assert_eq!(data["row"]["cells"][slot]["type"], cell_type);
        assert_eq!(data["row"]["total"], total);
    }

    let req = common::get(&format!("/api/schedules/{}/shifts", schedule_id), &ctx.admin_token)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let shifts = TestAssertions::assert_success(&body);
    assert_eq!(shifts.as_array().map(Vec::len), Some(1));
    assert_eq!(shifts[0]["id"], shift_id);
    assert_eq!(shifts[0]["startTime"], "08:00");
    assert_eq!(shifts[0]["endTime"], "16:00");
    assert_eq!(shifts[0]["type"], "regular");
}

#[actix_web::test]
async fn test_click_rejects_time_off_and_out_of_range() {
    let ctx = TestContext::new().await;
    let (maria, _) = ctx.employee("maria", "Maria Lopez").await;
    let schedule_id = common::seed_schedule(&ctx).await;

    let time_off = &ctx.state.repositories.time_off;
    let request = time_off
        .create(NewTimeOffRequest {
            user_id: maria.id,
            request_type: TimeOffType::Vacation,
            start_date: common::date("2024-06-04"),
            end_date: common::date("2024-06-04"),
            duration: TimeOffDuration::Morning,
            reason: None,
        })
        .await
        .unwrap();
    time_off
        .set_status(request.id, TimeOffStatus::Approved, ctx.admin.id)
        .await
        .unwrap();
    let app = common::init_app!(ctx);

    let uri = format!("/api/schedules/{}/grid/click", schedule_id);

    // Morning off covers 04:00 - 14:00
    let req = common::post(
        &uri,
        &ctx.admin_token,
        json!({ "userId": maria.id, "date": "2024-06-04", "slot": EIGHT_AM }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = common::post(
        &uri,
        &ctx.admin_token,
        json!({ "userId": maria.id, "date": "2024-06-04", "slot": 30 }),
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let data = TestAssertions::assert_success(&body);
    assert_eq!(data["row"]["notes"], "Vacation morning");
    assert_eq!(data["row"]["cells"][0]["isTimeOff"], true);

    let req = common::post(
        &uri,
        &ctx.admin_token,
        json!({ "userId": maria.id, "date": "2024-06-04", "slot": 40 }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = common::post(
        &uri,
        &ctx.admin_token,
        json!({ "userId": maria.id, "date": "2024-06-20", "slot": 10 }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = common::post(
        &uri,
        &ctx.admin_token,
        json!({ "userId": ctx.admin.id, "date": "2024-06-04", "slot": 10 }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_grid_projection_and_notes() {
    let ctx = TestContext::new().await;
    let (maria, maria_token) = ctx.employee("maria", "Maria Lopez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    let notes_uri = format!("/api/schedules/{}/grid/notes", schedule_id);
    let notes = json!({ "userId": maria.id, "date": "2024-06-03", "notes": "Training" });

    // Nothing to attach notes to yet
    let req = common::put(&notes_uri, &ctx.admin_token, notes.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = common::post(
        "/api/shifts",
        &ctx.admin_token,
        json!({
            "scheduleId": schedule_id,
            "userId": maria.id,
            "day": "monday",
            "startTime": "08:00",
            "endTime": "12:00",
            "type": "work",
            "notes": null,
            "area": null
        }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = common::put(&notes_uri, &ctx.admin_token, notes).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let row = TestAssertions::assert_success(&body);
    assert_eq!(row["notes"], "Training");
    assert_eq!(row["total"], 4.0);

    let grid_uri = format!("/api/schedules/{}/grid", schedule_id);
    let req = common::get(&grid_uri, &ctx.admin_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let grid = TestAssertions::assert_success(&body);
    assert_eq!(grid["slots"].as_array().map(Vec::len), Some(40));
    assert_eq!(grid["slots"][0], "04:00");
    assert_eq!(grid["days"].as_array().map(Vec::len), Some(7));
    let monday = &grid["days"][0]["rows"][maria.id.to_string()];
    assert_eq!(monday["cells"][EIGHT_AM]["type"], "work");
    assert_eq!(monday["cells"][16]["type"], Value::Null);

    let req = common::get(&grid_uri, &maria_token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_copy_day() {
    let ctx = TestContext::new().await;
    let (maria, _) = ctx.employee("maria", "Maria Lopez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    let req = common::post(
        "/api/shifts",
        &ctx.admin_token,
        json!({
            "scheduleId": schedule_id,
            "userId": maria.id,
            "day": "monday",
            "startTime": "08:00",
            "endTime": "12:00",
            "type": "work",
            "notes": "Opening",
            "area": null
        }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let uri = format!("/api/schedules/{}/grid/copy-day", schedule_id);
    let req = common::post(
        &uri,
        &ctx.admin_token,
        json!({ "fromDate": "2024-06-03", "toDate": "2024-06-05" }),
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let created = TestAssertions::assert_success(&body)["created"].clone();
    assert_eq!(created.as_array().map(Vec::len), Some(1));
    assert_eq!(created[0]["day"], "wednesday");
    assert_eq!(created[0]["startTime"], "08:00");
    assert_eq!(created[0]["endTime"], "12:00");
    assert_eq!(created[0]["notes"], "Opening");

    let req = common::post(
        &uri,
        &ctx.admin_token,
        json!({ "fromDate": "2024-06-03", "toDate": "2024-06-03" }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

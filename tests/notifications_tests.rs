use std::sync::Arc;

use actix_web::{http::StatusCode, test};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use staffsync::Repositories;
use staffsync::database::models::{Notification, NotificationInput};
use staffsync::database::repositories::NotificationRepository;

mod common;

use common::{TestAssertions, TestContext};

/// Refuses to store notifications for one user.
struct FailingFor {
    inner: Arc<dyn NotificationRepository>,
    user_id: i64,
}

#[async_trait]
impl NotificationRepository for FailingFor {
    async fn create(&self, input: NotificationInput) -> Result<Notification> {
        if input.user_id == self.user_id {
            return Err(anyhow!("storage unavailable"));
        }
        self.inner.create(input).await
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.inner.list_for_user(user_id).await
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool> {
        self.inner.mark_read(id, user_id).await
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        self.inner.mark_all_read(user_id).await
    }
}

#[actix_web::test]
async fn test_mark_read_and_mark_all_read() {
    let ctx = TestContext::new().await;
    let (maria, maria_token) = ctx.employee("maria", "Maria Lopez").await;
    let (_, luis_token) = ctx.employee("luis", "Luis Perez").await;
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    // Two publishes, two notifications each
    for _ in 0..2 {
        let req = common::post(
            &format!("/api/schedules/{}/publish", schedule_id),
            &ctx.admin_token,
            json!({}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = common::get("/api/notifications", &maria_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let items = TestAssertions::assert_success(&body);
    assert_eq!(items.as_array().map(Vec::len), Some(2));
    assert!(items.as_array().unwrap().iter().all(|n| n["userId"] == maria.id));
    assert_eq!(items[0]["isRead"], false);
    assert_eq!(items[0]["type"], "schedule_update");

    let first = items[0]["id"].as_i64().unwrap();
    let uri = format!("/api/notifications/{}/mark-read", first);

    // Someone else's notification is not found
    let req = common::post(&uri, &luis_token, json!({})).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = common::post(&uri, &maria_token, json!({})).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = common::post("/api/notifications/mark-all-read", &maria_token, json!({}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(TestAssertions::assert_success(&body)["updated"], 1);

    let req = common::get("/api/notifications", &maria_token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let items = TestAssertions::assert_success(&body);
    assert!(items.as_array().unwrap().iter().all(|n| n["isRead"] == true));
}

#[actix_web::test]
async fn test_publish_continues_past_failed_notification() {
    let base = Repositories::memory();
    // Users are created in order: admin 1, maria 2, luis 3
    let repositories = Repositories {
        notifications: Arc::new(FailingFor {
            inner: base.notifications.clone(),
            user_id: 2,
        }),
        ..base
    };
    let ctx = TestContext::with_repositories(repositories).await;
    let (maria, _) = ctx.employee("maria", "Maria Lopez").await;
    let (luis, _) = ctx.employee("luis", "Luis Perez").await;
    assert_eq!(maria.id, 2);
    let schedule_id = common::seed_schedule(&ctx).await;
    let app = common::init_app!(ctx);

    let req = common::post(
        &format!("/api/schedules/{}/publish", schedule_id),
        &ctx.admin_token,
        json!({}),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let outcome = TestAssertions::assert_success(&body);
    assert_eq!(outcome["schedule"]["isPublished"], true);
    assert_eq!(outcome["notifiedUsers"], 2);
    assert_eq!(outcome["failedUsers"], json!([maria.id]));

    let notifications = &ctx.state.repositories.notifications;
    assert!(notifications.list_for_user(maria.id).await.unwrap().is_empty());
    assert_eq!(notifications.list_for_user(luis.id).await.unwrap().len(), 1);
    assert_eq!(notifications.list_for_user(ctx.admin.id).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_notifications_require_auth() {
    let ctx = TestContext::new().await;
    let app = common::init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/notifications").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

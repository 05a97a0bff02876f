#![allow(dead_code)]

use actix_web::test;
use serde_json::Value;

use staffsync::database::models::{NewUser, User, UserRole};
use staffsync::{AppState, Config, Repositories};

pub const PASSWORD: &str = "password123";

/// Builds the service for a context. A macro because the service type
/// returned by `init_service` cannot be named.
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().configure(|cfg| $ctx.state.configure(cfg)),
        )
        .await
    };
}

pub(crate) use init_app;

// Test application wrapper over the in-memory store
pub struct TestContext {
    pub state: AppState,
    pub admin: User,
    pub admin_token: String,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_repositories(Repositories::memory()).await
    }

    pub async fn with_repositories(repositories: Repositories) -> Self {
        let state = AppState::new(Config::test_config(), repositories);
        state
            .auth_service
            .ensure_admin()
            .await
            .expect("Failed to seed admin");

        let admin = state
            .repositories
            .users
            .find_by_username("admin")
            .await
            .expect("Failed to load admin")
            .expect("Admin was not seeded");
        let admin_token = state
            .auth_service
            .generate_token(&admin)
            .expect("Failed to sign admin token");

        Self {
            state,
            admin,
            admin_token,
        }
    }

    /// Inserts an active employee and returns it with a signed token.
    pub async fn employee(&self, username: &str, name: &str) -> (User, String) {
        self.user(username, name, UserRole::Employee, true).await
    }

    pub async fn user(
        &self,
        username: &str,
        name: &str,
        role: UserRole,
        is_active: bool,
    ) -> (User, String) {
        let user = self
            .state
            .repositories
            .users
            .create(NewUser {
                username: username.to_string(),
                password_hash: self
                    .state
                    .auth_service
                    .hash_password(PASSWORD)
                    .expect("Failed to hash password"),
                name: name.to_string(),
                email: Some(format!("{username}@example.com")),
                role,
                is_active,
            })
            .await
            .expect("Failed to create user");
        let token = self
            .state
            .auth_service
            .generate_token(&user)
            .expect("Failed to sign token");

        (user, token)
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn get(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).insert_header(bearer(token))
}

pub fn post(uri: &str, token: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header(bearer(token))
        .set_json(body)
}

pub fn put(uri: &str, token: &str, body: Value) -> test::TestRequest {
    test::TestRequest::put()
        .uri(uri)
        .insert_header(bearer(token))
        .set_json(body)
}

pub fn patch(uri: &str, token: &str, body: Value) -> test::TestRequest {
    test::TestRequest::patch()
        .uri(uri)
        .insert_header(bearer(token))
        .set_json(body)
}

pub fn delete(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::delete()
        .uri(uri)
        .insert_header(bearer(token))
}

// Test assertion helpers
pub struct TestAssertions;

impl TestAssertions {
    /// Unwraps the `data` field of a successful envelope.
    pub fn assert_success(body: &Value) -> Value {
        assert_eq!(
            body["success"], true,
            "Expected successful response but got: {}",
            body
        );
        body["data"].clone()
    }

    pub fn assert_error(body: &Value) -> String {
        assert_eq!(body["success"], false, "Expected error response but got: {}", body);
        body["message"].as_str().unwrap_or_default().to_string()
    }
}

/// Creates the 2024-06-03 .. 2024-06-09 schedule and returns its id.
pub async fn seed_schedule(ctx: &TestContext) -> i64 {
    use staffsync::database::models::ScheduleInput;

    ctx.state
        .repositories
        .schedules
        .create(
            ScheduleInput {
                start_date: date("2024-06-03"),
                end_date: date("2024-06-09"),
            },
            ctx.admin.id,
        )
        .await
        .expect("Failed to create schedule")
        .id
}

pub fn date(value: &str) -> chrono::NaiveDate {
    value.parse().expect("Invalid date literal")
}

use actix_web::{HttpResponse, Responder};

pub mod auth;
pub mod documents;
pub mod grid;
pub mod notifications;
pub mod schedules;
pub mod shared;
pub mod shifts;
pub mod time_off;
pub mod users;
pub mod ws;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

use actix_web::web;

use crate::handlers;

pub mod auth;
pub mod documents;
pub mod notifications;
pub mod schedules;
pub mod shifts;
pub mod time_off;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/ws", web::get().to(handlers::ws::connect))
        .service(
            web::scope("/api")
                .configure(auth::configure)
                .configure(users::configure)
                .configure(schedules::configure)
                .configure(shifts::configure)
                .configure(time_off::configure)
                .configure(documents::configure)
                .configure(notifications::configure),
        );
}

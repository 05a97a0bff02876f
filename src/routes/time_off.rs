use actix_web::web;

use crate::handlers::time_off;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/time-off-requests")
            .route("", web::get().to(time_off::list_requests))
            .route("", web::post().to(time_off::create_request))
            .route("/{id}/approve", web::post().to(time_off::approve_request))
            .route("/{id}/reject", web::post().to(time_off::reject_request)),
    );
}

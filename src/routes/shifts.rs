use actix_web::web;

use crate::handlers::shifts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shifts")
            .route("", web::post().to(shifts::create_shift))
            .route("/{id}", web::patch().to(shifts::update_shift))
            .route("/{id}", web::delete().to(shifts::delete_shift)),
    );
}

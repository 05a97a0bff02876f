use actix_web::web;

use crate::handlers::documents;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/documents")
            .route("", web::get().to(documents::list_documents))
            .route("", web::post().to(documents::upload_document))
            .route("/{id}", web::get().to(documents::get_document))
            .route("/{id}", web::delete().to(documents::delete_document)),
    );
}

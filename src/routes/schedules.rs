use actix_web::web;

use crate::handlers::{grid, schedules};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/schedules")
            .route("", web::get().to(schedules::get_schedule_by_range))
            .route("", web::post().to(schedules::create_schedule))
            .route("/preview", web::post().to(schedules::preview_schedule))
            .route(
                "/auto-generate",
                web::post().to(schedules::auto_generate_schedule),
            )
            .route("/{id}", web::get().to(schedules::get_schedule))
            .route("/{id}/publish", web::post().to(schedules::publish_schedule))
            .route("/{id}/shifts", web::get().to(schedules::get_schedule_shifts))
            .route("/{id}/grid", web::get().to(grid::get_grid))
            .route("/{id}/grid/click", web::post().to(grid::click_cell))
            .route("/{id}/grid/notes", web::put().to(grid::update_row_notes))
            .route("/{id}/grid/copy-day", web::post().to(grid::copy_day)),
    );
}

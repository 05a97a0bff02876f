use std::sync::Arc;

use actix_web::web;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
pub use database::repositories::Repositories;
pub use error::AppError;
pub use services::{AuthService, NotificationHub, NotificationService};

/// Everything the handlers share, built once per process.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repositories: Repositories,
    pub hub: Arc<NotificationHub>,
    pub auth_service: AuthService,
    pub notifier: NotificationService,
}

impl AppState {
    pub fn new(config: Config, repositories: Repositories) -> Self {
        let hub = Arc::new(NotificationHub::new());
        let auth_service = AuthService::new(config.clone(), repositories.users.clone());
        let notifier = NotificationService::new(repositories.notifications.clone(), hub.clone());

        Self {
            config,
            repositories,
            hub,
            auth_service,
            notifier,
        }
    }

    /// Registers shared state, extractor error handlers and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let repos = &self.repositories;

        cfg.app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.auth_service.clone()))
            .app_data(web::Data::new(self.notifier.clone()))
            .app_data(web::Data::from(self.hub.clone()))
            .app_data(web::Data::from(repos.users.clone()))
            .app_data(web::Data::from(repos.schedules.clone()))
            .app_data(web::Data::from(repos.shifts.clone()))
            .app_data(web::Data::from(repos.time_off.clone()))
            .app_data(web::Data::from(repos.documents.clone()))
            .app_data(web::Data::from(repos.notifications.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                AppError::BadRequest(format!("Invalid request body: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                AppError::BadRequest(format!("Invalid query: {}", err)).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                AppError::BadRequest(format!("Invalid path: {}", err)).into()
            }))
            .configure(routes::configure);
    }
}

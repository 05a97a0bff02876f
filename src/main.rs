use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger};
use anyhow::Result;

use staffsync::config::StorageBackend;
use staffsync::database::init_database;
use staffsync::middleware::RequestId;
use staffsync::{AppState, Config, Repositories};

#[actix_web::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting StaffSync API (environment: {})",
        config.environment
    );

    let repositories = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = init_database(&config.database_url).await?;
            log::info!("Database initialized");
            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on restart");
            Repositories::memory()
        }
    };

    let state = AppState::new(config.clone(), repositories);
    state.auth_service.ensure_admin().await?;

    let bind_address = config.server_address();
    log::info!("Server listening on http://{}", bind_address);

    let client_origin = config.client_base_url.clone();
    let allow_any_origin = config.is_development();

    HttpServer::new(move || {
        let cors = if allow_any_origin {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_origin(&client_origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    "Authorization",
                    "Content-Type",
                    "Accept",
                    "X-Requested-With",
                    "X-Correlation-ID",
                ])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %T correlation_id=%{x-correlation-id}o"#,
            ))
            .configure(|cfg| state.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

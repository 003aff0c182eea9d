use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod db;
mod extract;
mod model;
mod service;

use app::AppState;
use model::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let db_pool = web::Data::new(state.db_pool);
    let cache = web::Data::new(state.cache);
    let analysis_service = web::Data::from(state.analysis_service);
    let repository = web::Data::new(state.repository);
    let allowed_origins = config.allowed_origins.clone();

    tracing::info!("Starting Contract Intel server on {}", bind_addr);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allow_any_header()
            .supports_credentials();
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .app_data(db_pool.clone())
            .app_data(cache.clone())
            .app_data(analysis_service.clone())
            .app_data(repository.clone())
            .configure(api::analysis::configure)
            .configure(api::samples::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}

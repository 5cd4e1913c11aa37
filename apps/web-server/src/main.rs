//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use background::Housekeeping;
use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let mut housekeeping = Housekeeping::start(
        &config.scheduler,
        &config.session.purge_schedule,
        state.sessions.clone(),
        state.limiter.clone(),
    )
    .await
    .map_err(|e| std::io::Error::other(e.to_string()))?;

    let result = HttpServer::new(move || {
        let limiter = state.limiter.clone();
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    if let Err(e) = housekeeping.shutdown().await {
        tracing::warn!(error = %e, "Scheduler shutdown failed");
    }

    result
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod auth;
mod config;
mod db;
mod engine;
mod metrics;
mod models;
mod utils;

use crate::config::AppConfig;
use crate::db::Database;
use crate::engine::Engine;

pub struct AppState {
    pub db: Database,
    pub engine: Engine,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tochka_exchange=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting Tochka Exchange v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.environment);

    // Install Prometheus recorder before anything records a metric
    let metrics_handle = metrics::init_metrics();

    // Initialize database: schema and first-startup seed data
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connected");
    db.migrate().await?;
    db.bootstrap(&config.admin_token).await?;

    // Initialize the exchange engine
    let engine = Engine::new(db.pool.clone());
    tracing::info!("Exchange engine initialized");

    // Build application state
    let state = Arc::new(AppState { db, engine });

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/metrics",
            get(move || {
                let body = metrics_handle.render();
                async move { body }
            }),
        )
        .nest("/api/v1", api::routes::create_router(state.clone()))
        .layer(axum_middleware::from_fn(
            api::middleware::metrics::metrics_middleware,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

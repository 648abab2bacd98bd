mod catalog;
mod coaching;
mod config;
mod db;
mod errors;
mod lingua;
mod llm_client;
mod models;
mod persistence;
mod preferences;
mod routes;
mod shop;
mod state;
mod syllabus;
mod validator;
mod workspace;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::AiGateway;
use crate::persistence::device::RedisDeviceStore;
use crate::persistence::postgres::PgProfileStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workspace::sessions::SessionRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career OS API v{}", env!("CARGO_PKG_VERSION"));

    // Profile store (PostgreSQL)
    let db = create_pool(&config.database_url).await?;
    let profiles = Arc::new(PgProfileStore::new(db));

    // Device store (Redis)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let device = Arc::new(RedisDeviceStore::connect(&redis, config.device_value_max_bytes).await?);

    // AI gateway
    let ai = AiGateway::from_api_key(config.gemini_api_key.clone(), config.ai_timeout)?;
    if ai.is_configured() {
        info!("AI gateway online (model: {})", llm_client::MODEL);
    } else {
        warn!("GEMINI_API_KEY not set; AI features will use offline fallbacks");
    }

    let sessions = SessionRegistry::start(profiles, config.save_debounce);

    let state = AppState {
        sessions: sessions.clone(),
        device,
        ai,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Write out anything still inside the debounce window.
    sessions.flush().await;
    info!("Pending profile writes flushed; bye");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

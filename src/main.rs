//! Care Assistant - healthcare portal chat widget backend
//!
//! Serves per-visitor widget sessions: a transcript, a keyword reply
//! resolver and the exchange state machine that sequences them.

mod api;
mod config;
mod resolver;
mod runtime;
mod state_machine;
mod suggestions;
mod surface;
mod transcript;

use api::{create_router, AppState};
use config::AssistantConfig;
use runtime::SessionManager;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "care_assistant=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AssistantConfig::from_env();
    tracing::info!(
        port = config.port,
        reply_delay_ms = config.reply_delay.as_millis(),
        reply_timeout_ms = ?config.reply_timeout.map(|d| d.as_millis()),
        session_ttl_secs = ?config.session_ttl.map(|d| d.as_secs()),
        "Configuration loaded"
    );

    // Reply resolver shared by every session
    let resolver = resolver::build_resolver(config.reply_delay, config.reply_timeout);
    let state = AppState::new(SessionManager::new(resolver));

    // Tabs that close never end their session; expire them instead
    match config.session_ttl {
        Some(ttl) => {
            state.sessions.spawn_reaper(ttl);
        }
        None => tracing::warn!("Session expiry disabled; sessions live until deleted"),
    }

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Care assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

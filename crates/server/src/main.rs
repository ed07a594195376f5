//! Punchcard server - HTTP API for the loyalty customer store.
//!
//! Serves the endpoints the mobile client shell consumes (customer list,
//! single customer, simulated NFC/QR scan, award points) over an in-memory
//! store seeded at startup. Process-local: state resets on restart.

#![cfg_attr(not(test), forbid(unsafe_code))]

use punchcard_server::config::ServerConfig;
use punchcard_server::routes;
use punchcard_server::state::AppState;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing with EnvFilter.
    // Defaults to info level for our crate if RUST_LOG is not set.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "punchcard_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("Failed to load configuration");
    let addr = config.socket_addr();

    let state = AppState::from_config(config).expect("Failed to seed customer store");
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(%addr, "Punchcard server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

//! Standalone mock auth service for local development.
//!
//! Serves the swiftsend auth contract on `SWIFTSEND_MOCK_ADDR`
//! (default `127.0.0.1:4010`). Control log verbosity with `RUST_LOG`.

use std::io;
use std::net::SocketAddr;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ADDR_ENV: &str = "SWIFTSEND_MOCK_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:4010";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let addr: SocketAddr = std::env::var(ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let app = swiftsend_mock::router().layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Mock auth service listening");
    axum::serve(listener, app).await?;

    Ok(())
}

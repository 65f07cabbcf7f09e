//! Term Query Service
//!
//! HTTP front end for the term query handler.
//!
//! # Service Topology
//!
//! - `/health` - Liveness probe
//! - `/ready` - Readiness probe (schema loaded)
//! - `/api/v1/terms` - Filtered term lookup; query-string parameters become
//!   SOQL predicates

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use term_query_handlers::{QueryExecutorClient, TermGetHandler};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: the log level comes from it
    let config = config::Config::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "term_query_service={level},term_query_handlers={level},tower_http=info",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting term query service"
    );
    config.log_startup();

    // Schema and query client are built once and shared by every request
    let schema = Arc::new(config.load_schema()?);
    info!(fields = schema.len(), "Schema loaded");

    let executor = QueryExecutorClient::new(config.query_executor()?)
        .context("Failed to create query service client")?;

    let state = routes::AppState::new(TermGetHandler::new(schema, Arc::new(executor)));
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

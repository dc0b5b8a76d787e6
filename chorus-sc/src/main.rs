//! Session Coordinator (chorus-sc) - Main entry point
//!
//! Hosts the collaborative listening-session engine: members join
//! sessions, propose and vote on tracks, and the host (or a delegate)
//! drives transport. Every applied mutation is broadcast to the
//! session's roster over SSE.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chorus_sc::api::{self, AppContext};
use chorus_sc::catalog::{Catalog, FixtureCatalog, HttpCatalog};
use chorus_sc::config::Config;
use chorus_sc::gateway::SessionGateway;
use chorus_sc::session::SessionRegistry;

/// Command-line arguments for chorus-sc
#[derive(Parser, Debug)]
#[command(name = "chorus-sc")]
#[command(about = "Session coordinator for CHORUS shared listening")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "CHORUS_SC_PORT")]
    port: Option<u16>,

    /// Empty-roster teardown grace period in seconds
    #[arg(long, env = "CHORUS_SC_TEARDOWN_GRACE")]
    teardown_grace_secs: Option<u64>,

    /// Base URL of the external catalog service
    #[arg(long, env = "CHORUS_CATALOG_URL")]
    catalog_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorus_sc=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments and resolve remaining settings
    let args = Args::parse();
    let config = Config::resolve(args.port, args.teardown_grace_secs, args.catalog_url)
        .context("Failed to resolve configuration")?;

    info!("Starting CHORUS Session Coordinator on port {}", config.port);
    info!(
        "Teardown grace period: {}s, event capacity: {}",
        config.teardown_grace_secs, config.event_capacity
    );

    let catalog = match &config.catalog_base_url {
        Some(url) => {
            info!("Catalog service: {}", url);
            Catalog::Http(HttpCatalog::new(url.clone()))
        }
        None => {
            info!("No catalog service configured, using offline fixture catalog");
            Catalog::Fixture(FixtureCatalog::new())
        }
    };

    let registry = Arc::new(SessionRegistry::new(
        Duration::from_secs(config.teardown_grace_secs),
        config.event_capacity,
    ));
    let gateway = Arc::new(SessionGateway::new(registry, catalog));

    // Build the application router
    let app = api::create_router(AppContext { gateway });

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

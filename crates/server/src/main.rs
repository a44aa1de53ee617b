//! Beans server binary
//!
//! Usage:
//! ```bash
//! BEANS_ADMIN_PASSWORD=... beans --database-url sqlite:data/beans.db?mode=rwc --bind 0.0.0.0:8080
//! ```

use anyhow::{Context, Result};
use beans_business::ServiceContext;
use beans_persistence::Database;
use beans_server::{router, Cli};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "beans=info,beans_server=info,beans_business=info,beans_persistence=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Some(dir) = cli.database_dir() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }

    let db = Database::connect(&cli.database_url, cli.max_connections)
        .await
        .context("Failed to open database")?;

    let config = cli.economy_config();
    if !config.admin_enabled() {
        tracing::warn!("BEANS_ADMIN_PASSWORD is empty, admin login is disabled");
    }

    let app = router(ServiceContext::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    tracing::info!("Beans server running on http://{}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    tracing::info!("Beans server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

use std::sync::Arc;

use anyhow::Context;
use credit_application_service::{
    adapters::{
        database::{memory::MemoryDatabase, postgres::PostgresDatabase},
        http,
    },
    commands::DomainLogic,
    config::Settings,
    telemetry,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let settings = Settings::load().context("loading configuration")?;
    telemetry::init(&settings.log_level, settings.log_format);

    let app = match &settings.database {
        Some(database_settings) => {
            let database = Arc::new(
                PostgresDatabase::connect(database_settings)
                    .await
                    .context("connecting to database")?,
            );
            http::router(DomainLogic::new(database.clone(), database))
        }
        None => {
            warn!("no database configured, data will not survive a restart");
            let database = Arc::new(MemoryDatabase::default());
            http::router(DomainLogic::new(database.clone(), database))
        }
    };

    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

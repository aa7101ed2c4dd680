//! ServiLog - Main Entry Point

use anyhow::Context;
use api::{create_router, init_logging, AppState, Settings};
use mailer::{LogMailer, Mailer, SmtpMailer};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use storage::PgRepository;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    init_logging(&settings.log);

    info!("=== ServiLog API v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {:?}", settings);

    let repo = PgRepository::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    repo.migrate().await.context("Failed to run migrations")?;

    let mailer: Arc<dyn Mailer> = if settings.mail.smtp_host.is_some() {
        Arc::new(SmtpMailer::new(&settings.mail).context("Failed to configure SMTP")?)
    } else {
        warn!("No SMTP host configured; emails are only logged");
        Arc::new(LogMailer::new())
    };

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };

    let addr = settings.server.addr();
    let state = AppState::new(settings, Arc::new(repo), mailer, metrics)
        .context("Failed to initialise application state")?;
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use footfall::api;
use footfall::config::Config;
use footfall::storage::{self, Storage, TimeoutStorage};
use footfall::visit::VisitService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let backend = storage::connect(&config.database).await?;
    let ledger: Arc<dyn Storage> = Arc::new(TimeoutStorage::new(
        backend,
        Duration::from_millis(config.visits.storage_timeout_ms),
    ));

    // The schema is re-checked on every visit, so a failure here is not fatal
    info!("Initializing database...");
    match ledger.ensure_schema().await {
        Ok(()) => info!("Database initialized successfully"),
        Err(e) => warn!("Database initialization failed, will retry per request: {}", e),
    }

    let visits = VisitService::new(ledger, config.visits.dedupe_window_secs);
    info!(
        "Dedupe window: {}s, storage timeout: {}ms",
        config.visits.dedupe_window_secs, config.visits.storage_timeout_ms
    );

    if config.cors.allowed_origins.is_empty() {
        info!("CORS: allowing any origin on /api/*");
    } else {
        info!("CORS: allowing origins {:?}", config.cors.allowed_origins);
    }

    // Log frontend configuration
    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving frontend from directory: {}", static_dir);
    } else {
        info!("🎨 No FRONTEND_STATIC_DIR set, serving API only");
    }

    let router = api::create_api_router(
        visits,
        config.platform_name.clone(),
        &config.cors,
        &config.frontend,
    );

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Visit counter at http://{}/api/visit-count", addr);

    axum::serve(listener, router)
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

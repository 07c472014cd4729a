// SWIFT Code Lookup Service - Web Server
// REST API with Axum over the SQLite store

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use swift_codes::api::build_router;
use swift_codes::{load_if_empty, logging, Config, LoadOutcome, SqliteRepository, SwiftCodeService};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env();

    // Open database (created on first run)
    let repo = Arc::new(
        SqliteRepository::open(&config.db_path)
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?,
    );

    // Startup import; a failure is logged and the server still starts
    match load_if_empty(&*repo, &config.data_file) {
        Ok(LoadOutcome::Loaded(report)) => {
            info!(imported = report.imported, "startup import finished")
        }
        Ok(LoadOutcome::AlreadyLoaded) => {}
        Err(e) => error!(error = %e, path = %config.data_file.display(), "Error loading data"),
    }

    let service = SwiftCodeService::new(repo);
    let app = build_router(service);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

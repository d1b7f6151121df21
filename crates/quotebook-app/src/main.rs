//! Quotebook server binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Initialize tracing
//! 3. Open the SQLite entity store (or an in-memory one)
//! 4. Start the axum REST API server

mod cli;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quotebook_api::routes;
use quotebook_api::state::AppState;
use quotebook_core::config::QuotebookConfig;
use quotebook_storage::Database;

use crate::cli::CliArgs;

/// `RUST_LOG` wins over the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn open_database(config: &QuotebookConfig) -> Result<Database, quotebook_core::QuotebookError> {
    if config.database.in_memory {
        tracing::info!("Using in-memory database; data will not persist");
        return Database::in_memory();
    }
    let path = Path::new(&config.database.path);
    if config.database.skip_setup {
        tracing::info!("Skipping schema setup");
    }
    Database::open(path, !config.database.skip_setup)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Resolved under a bootstrap subscriber so fallback and override
    // warnings are visible before the configured level is known.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter(args.log_level.as_deref().unwrap_or("info")))
        .finish();
    let (config_file, config) =
        tracing::subscriber::with_default(bootstrap, || args.resolve_config());

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.general.log_level))
        .init();

    tracing::info!("Starting quotebook v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Storage.
    let database = match open_database(&config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(path = %config.database.path, error = %e, "Failed to open database");
            return Err(e.into());
        }
    };

    let state = AppState::new(database, config.pagination.clone());

    // === API server ===

    if let Err(e) = routes::start_server(&config.server, state).await {
        tracing::error!(
            addr = %config.server.bind_addr(),
            error = %e,
            "API server failed - is another instance running?"
        );
        return Err(e.into());
    }

    Ok(())
}

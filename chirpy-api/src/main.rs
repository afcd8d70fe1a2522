//! # Chirpy API Server
//!
//! Serves the Chirpy JSON API, the admin pages and the static front end.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=... DATABASE_URL=postgres://... cargo run -p chirpy-api
//! ```
//!
//! Set `STORAGE_BACKEND=memory` to run without PostgreSQL.

use anyhow::Context;
use chirpy_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
};
use chirpy_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{MemoryStore, PgStore, Store},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_api=debug,chirpy_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Chirpy API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(platform = %config.api.platform, backend = ?config.database.backend, "Configuration loaded");

    let mut pool = None;
    let store: Arc<dyn Store> = match config.database.backend {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .clone()
                .context("DATABASE_URL environment variable is required")?;

            ensure_database_exists(&url).await?;
            let pg = create_pool(DatabaseConfig {
                url,
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await
            .context("Failed to connect to database")?;
            run_migrations(&pg).await.context("Failed to run migrations")?;

            pool = Some(pg.clone());
            Arc::new(PgStore::new(pg))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(&pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

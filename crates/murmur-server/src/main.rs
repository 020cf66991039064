mod config;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use murmur_api::AppStateInner;
use murmur_db::Database;

use crate::config::{Config, PLACEHOLDER_SECRET};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "murmur=debug,murmur_api=debug,murmur_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    if config.jwt_secret == PLACEHOLDER_SECRET {
        warn!("MURMUR_JWT_SECRET is unset; using the development placeholder");
    }

    let db = Arc::new(
        open_with_retry(&config.db_path, config.db_connect_attempts, config.db_retry_delay).await?,
    );

    let state = Arc::new(AppStateInner::new(
        db.clone(),
        config.jwt_secret.clone(),
        config.session_ttl,
    ));

    let app = murmur_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Murmur server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and its state) is gone once serve returns
    match Arc::try_unwrap(db) {
        Ok(db) => db.close()?,
        Err(_) => warn!("Database still referenced at shutdown; skipping explicit close"),
    }

    Ok(())
}

/// Open the database, retrying a bounded number of times with a fixed delay.
async fn open_with_retry(path: &Path, attempts: u32, delay: Duration) -> anyhow::Result<Database> {
    let mut attempt = 1;
    loop {
        info!("Attempt {}/{} to open database at {}", attempt, attempts, path.display());
        let p = path.to_path_buf();
        match tokio::task::spawn_blocking(move || Database::open(&p)).await? {
            Ok(db) => return Ok(db),
            Err(e) if attempt < attempts => {
                warn!("Database not ready ({:#}); retrying in {:?}", e, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!("Could not open database after {} attempts", attempts);
                return Err(e);
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

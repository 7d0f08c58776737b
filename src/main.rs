use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod db;
mod error;
mod handlers;
mod models;

use crate::config::Config;
use crate::db::{PgProductStore, ProductStore};

/// Shared application state. The store is built once at startup and handed to every
/// request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,product_service=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!(version = handlers::API_VERSION, "Starting Product Management API");

    let store: Arc<dyn ProductStore> = Arc::new(PgProductStore::connect(&config).await?);
    let state = AppState {
        store: Arc::clone(&store),
    };

    let app = build_router(state);

    let addr = config.bind_addr();
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Shutdown complete.");

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))
        .route("/health/detailed", get(handlers::detailed_health))

        // ── Products CRUD ───────────────────────────────────────────────────
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::products::get_product).delete(handlers::products::delete_product),
        )
        .route(
            "/products/name/:name",
            get(handlers::products::get_product_by_name)
                .put(handlers::products::update_product_by_name),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

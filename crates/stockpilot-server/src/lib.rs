//! StockPilot HTTP API.
//!
//! Every product action the web front end needs is a JSON route here;
//! media bytes never pass through, clients get upload credentials and talk
//! to object storage directly.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use stockpilot_core::{Inventory, SqliteProductStore};
use stockpilot_media::{MediaClient, MediaConfig};
use tokio::net::TcpListener;
use tracing::info;

pub mod config;
pub mod error;
mod handlers;
mod request_tracing;
mod telemetry;

pub use config::ServerConfig;
pub use error::ApiError;
pub use telemetry::init_tracing;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub inventory: Arc<Inventory<SqliteProductStore>>,
    pub media: MediaClient,
    pub config: Arc<ServerConfig>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        inventory: Inventory<SqliteProductStore>,
        media: MediaClient,
        config: ServerConfig,
    ) -> Self {
        Self {
            inventory: Arc::new(inventory),
            media,
            config: Arc::new(config),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Open the product database named in `config` and build the media
    /// client from `media`.
    pub fn open(config: ServerConfig, media: MediaConfig) -> anyhow::Result<Self> {
        let store = SqliteProductStore::open(&config.db_path).with_context(|| {
            format!("failed to open product database {}", config.db_path.display())
        })?;
        let media = MediaClient::new(media).context("failed to build media client")?;
        Ok(Self::new(Inventory::new(store), media, config))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/version", get(handlers::version))
        .route("/v1/categories", get(handlers::categories))
        .route(
            "/v1/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/v1/products/:id",
            get(handlers::get_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/v1/products/:id/stock", put(handlers::set_stock))
        .route("/v1/products/:id/restock", post(handlers::restock))
        .route("/v1/low-stock", get(handlers::low_stock))
        .route("/v1/dashboard", get(handlers::dashboard_snapshot))
        .route("/v1/reports/inventory", get(handlers::category_report))
        .route(
            "/v1/media/upload-credentials",
            post(handlers::upload_credentials),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, media_configured = state.media.is_configured(), "stockpilot server listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server failed")
}

/// Bind `config.bind_addr` and serve until SIGINT/SIGTERM.
pub async fn serve(config: ServerConfig, media: MediaConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let state = AppState::open(config, media)?;
    serve_with_shutdown(listener, state, wait_for_shutdown_signal()).await?;
    info!("stockpilot server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("signal handlers unavailable; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

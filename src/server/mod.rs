//! HTTP front end.

pub mod extract;
pub mod handlers;
pub mod response;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::service::DocumentService;
use handlers::AppState;

pub fn build_router(service: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/templates", get(handlers::list_docx_templates))
        .route(
            "/api/templates/{name}/variables",
            get(handlers::docx_template_variables),
        )
        .route("/api/generate", post(handlers::generate_docx))
        .route("/api/preview", post(handlers::preview_docx_pdf))
        .route("/api/v2/status", get(handlers::status))
        .route("/api/v2/templates", get(handlers::list_html_templates))
        .route("/api/v2/template-info", get(handlers::html_template_info))
        .route("/api/v2/preview-html", post(handlers::preview_html))
        .route("/api/v2/generate-html", post(handlers::generate_html))
        .route("/api/v2/preview-pdf", post(handlers::preview_pdf))
        .route("/api/v2/generate-pdf", post(handlers::generate_pdf))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

pub struct AppServer {
    service: Arc<DocumentService>,
}

impl AppServer {
    pub fn new(service: Arc<DocumentService>) -> Self {
        Self { service }
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn start(self) -> Result<()> {
        let addr = self.service.config().bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        self.serve(listener, shutdown_signal()).await
    }

    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        info!("Gym Log API listening on {}", listener.local_addr()?);

        let sweeper = spawn_cleanup_sweep(Arc::clone(&self.service));
        let app = build_router(self.service);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(handle) = sweeper {
            handle.abort();
        }
        served.context("Server error")?;
        info!("Server stopped");
        Ok(())
    }
}

/// Periodically remove old artifacts. Returns `None` when the sweep is
/// disabled by a zero interval.
pub fn spawn_cleanup_sweep(service: Arc<DocumentService>) -> Option<JoinHandle<()>> {
    let cleanup = service.config().cleanup.clone();
    if cleanup.sweep_interval_minutes == 0 {
        debug!("Periodic cleanup disabled");
        return None;
    }

    let period = Duration::from_secs(cleanup.sweep_interval_minutes * 60);
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = service.cleanup_old_files(cleanup.max_age_hours).await;
            debug!("Periodic cleanup removed {} file(s)", removed);
        }
    }))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

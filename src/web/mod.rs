//! Web server module for the dithering control UI.
//!
//! Provides an HTTP server using Axum for the drag-and-drop intake, parameter
//! form, and preview/download endpoints.

pub mod routes;
pub mod templates;

use crate::config::Config;
use axum::extract::DefaultBodyLimit;
use axum::{routing::get, routing::post, Router};
use routes::{AppState, Session};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// Accept image drops up to 32 MiB
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),

    #[error("Server error: {0}")]
    ServerError(String),
}

/// Web server holding the shared config and session state
pub struct WebServer {
    config: Arc<RwLock<Config>>,
    session: Arc<RwLock<Session>>,
    config_path: String,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: Config, config_path: String) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            session: Arc::new(RwLock::new(Session::default())),
            config_path,
        }
    }

    /// Get shared config reference
    pub fn config(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        let state = AppState {
            config: Arc::clone(&self.config),
            session: Arc::clone(&self.session),
            config_path: self.config_path.clone(),
        };

        Router::new()
            .route("/", get(routes::index))
            .route("/image", post(routes::upload_image))
            .route("/save", post(routes::save_config))
            .route("/apply", post(routes::save_and_apply))
            .route("/action/:action", get(routes::session_action))
            .route("/output.png", get(routes::output_png))
            .route("/health", get(routes::health))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .with_state(state)
    }

    /// Run the web server with graceful shutdown
    pub async fn run_with_shutdown(
        &self,
        port: u16,
        shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> Result<(), WebError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Web server listening on http://{}", addr);

        let mut shutdown = shutdown;
        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Web server shutting down gracefully");
            })
            .await
            .map_err(|e| WebError::ServerError(e.to_string()))
    }
}

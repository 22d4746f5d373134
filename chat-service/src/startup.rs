//! Application startup and lifecycle management.

use crate::config::ChatConfig;
use crate::handlers;
use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::genai::gemini::{GeminiConfig, GeminiTextProvider};
use service_core::genai::{ChatSession, TextProvider};
use service_core::middleware::{
    cors_layer, http_trace_layer, metrics_middleware, request_id_middleware,
};
use service_core::observability::metrics_endpoint;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ChatConfig,
    pub session: Arc<ChatSession>,
}

impl FromRef<AppState> for Arc<ChatSession> {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(metrics_endpoint))
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application backed by the Gemini API.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let gemini_config = GeminiConfig::from_settings(&config.google, &config.models);
        let provider = GeminiTextProvider::new(gemini_config).map_err(|e| {
            tracing::error!("Failed to initialize Gemini provider: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;

        tracing::info!(
            model = %config.models.text_model,
            "Initialized Gemini text provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an arbitrary provider (mocks in tests).
    pub async fn build_with_provider(
        config: ChatConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            session: Arc::new(ChatSession::new(provider)),
            config: config.clone(),
        };

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chat service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the process chat session.
    pub fn session(&self) -> Arc<ChatSession> {
        self.state.session.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, router(self.state)).await
    }
}

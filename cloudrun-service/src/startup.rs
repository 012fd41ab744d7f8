//! Application startup and lifecycle management.

use crate::config::{CloudrunConfig, CounterBackend, ImageProviderKind};
use crate::handlers::{self, counter, generate_image, health_check, index, readiness_check};
use crate::middleware::metrics_middleware;
use crate::services::providers::gemini::{GeminiConfig, GeminiImageProvider};
use crate::services::providers::mock::MockImageProvider;
use crate::services::providers::ImageProvider;
use crate::services::{metrics, CounterDb, CounterStore, ImageGenerator, InMemoryCounterStore};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::panic::panic_to_envelope;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: CloudrunConfig,
    pub counter_store: Arc<dyn CounterStore>,
    pub image_generator: ImageGenerator,
}

impl AppState {
    pub fn new(
        config: CloudrunConfig,
        counter_store: Arc<dyn CounterStore>,
        image_provider: Arc<dyn ImageProvider>,
    ) -> Self {
        Self {
            config,
            counter_store,
            image_generator: ImageGenerator::new(image_provider),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.http.max_body_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api/count", any(counter))
        .route("/api/generate_image", any(generate_image))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route_layer(from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_to_envelope))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn build_counter_store(config: &CloudrunConfig) -> Result<Arc<dyn CounterStore>, AppError> {
    match config.storage.backend {
        CounterBackend::Mongo => {
            let db = CounterDb::connect(
                &config.storage.mongodb.uri,
                &config.storage.mongodb.database,
            )
            .await?;
            Ok(Arc::new(db))
        }
        CounterBackend::Memory => {
            tracing::warn!("Using in-memory counter store; the count is lost on restart");
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
    }
}

fn build_image_provider(config: &CloudrunConfig) -> Result<Arc<dyn ImageProvider>, AppError> {
    match config.genai.provider {
        ImageProviderKind::Gemini => {
            let api_key = config.genai.api_key.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("GOOGLE_API_KEY is required for Gemini"))
            })?;

            let provider = GeminiImageProvider::new(GeminiConfig {
                api_key,
                model: config.genai.image_model.clone(),
                timeout: Duration::from_secs(config.genai.request_timeout_secs),
                base_url: config.genai.api_base_url.clone(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

            tracing::info!(
                model = %config.genai.image_model,
                "Initialized Gemini image provider"
            );
            Ok(Arc::new(provider))
        }
        ImageProviderKind::Mock => {
            tracing::warn!("Using mock image provider");
            Ok(Arc::new(MockImageProvider::new()))
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: CloudrunConfig) -> Result<Self, AppError> {
        metrics::init_metrics()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("metrics: {}", e)))?;

        let counter_store = build_counter_store(&config).await.map_err(|e| {
            tracing::error!("Failed to initialize counter store: {}", e);
            e
        })?;
        let image_provider = build_image_provider(&config)?;

        let state = AppState::new(config.clone(), counter_store, image_provider);

        // Bind HTTP listener (port 0 = random port for testing)
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Cloudrun service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

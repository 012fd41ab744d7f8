use cloudrun_service::config::CloudrunConfig;
use cloudrun_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Tracing needs the log level, so configuration errors before init go to stderr.
    let config = CloudrunConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "cloudrun-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        counter_store = ?config.storage.backend,
        image_provider = ?config.genai.provider,
        "Starting cloudrun-service"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}

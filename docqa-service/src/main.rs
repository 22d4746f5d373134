use docqa_service::config::DocQaConfig;
use docqa_service::startup::Application;
use service_core::observability::{init_metrics, init_tracing};
use service_core::server::shutdown_signal;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("docqa-service", &log_level, otlp_endpoint.as_deref());

    if let Err(e) = init_metrics() {
        tracing::warn!("Metrics disabled: {}", e);
    }

    let config = DocQaConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tokio::select! {
        result = app.run_until_stopped() => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
                return Err(e);
            }
        }
        _ = shutdown_signal() => {}
    }

    Ok(())
}

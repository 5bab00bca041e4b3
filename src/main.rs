//! MailBud server binary entry point

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mailbud::adapters::{build_router, CycleAppState, HttpBackendConfig, HttpWorkflowBackend};
use mailbud::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let backend_config = HttpBackendConfig::new(config.backend.base_url.clone())
        .with_fetch_path(config.backend.fetch_path.clone())
        .with_schedule_path(config.backend.schedule_path.clone())
        .with_timeout(config.backend.timeout());
    let backend = HttpWorkflowBackend::new(backend_config)?;

    let state = CycleAppState::new(Arc::new(backend))
        .with_message_display(config.workflow.message_display());
    let app = build_router(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        backend = %config.backend.base_url,
        environment = ?config.server.environment,
        "Starting MailBud server"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// JSON logs in production, human-readable output elsewhere.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.server.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

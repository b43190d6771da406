use roi_narrative_service::{
    api::start_server,
    config::AppConfig,
    llm::OpenAiClient,
    narrative::NarrativeService,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env + environment once
    let config = Arc::new(AppConfig::from_env()?);

    info!("ROI Narrative Service - API Server");
    info!("Port: {}", config.port);
    info!("Model: {}", config.model);

    let client = OpenAiClient::new(&config)?;
    let narratives = Arc::new(NarrativeService::new(Arc::new(client)));

    info!("Narrative service initialized");
    info!("Starting API server...");

    start_server(config, narratives).await?;

    Ok(())
}

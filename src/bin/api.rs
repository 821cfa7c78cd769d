use std::sync::Arc;
use strategy_consultant::{
    api::start_server, config::Config, gemini::GeminiClient, orchestrator::StrategyOrchestrator,
    state::SessionStore,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(|e| {
        error!("{}", e);
        eprintln!("⚠️  {}", e);
        eprintln!("📌 Set GEMINI_API_KEY in the environment or in .env");
        e
    })?;

    info!("🚀 GenAI Strategy Consultant - API Server");
    info!("📍 Port: {}", config.port);
    info!("🤖 Model: {}", config.model);
    match config.request_timeout {
        Some(timeout) => info!("⏱️  Generation timeout: {:?}", timeout),
        None => info!("⏱️  Generation timeout: none"),
    }

    let client = GeminiClient::from_config(&config)?;
    let orchestrator =
        Arc::new(StrategyOrchestrator::new(Arc::new(client)).with_timeout(config.request_timeout));

    let sessions = SessionStore::with_idle_ttl(orchestrator, config.session_ttl);

    info!("✅ Orchestrator initialized");
    info!("📡 Starting API server...");

    start_server(sessions, config.port).await?;

    Ok(())
}

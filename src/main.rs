use anyhow::Result;
use research_assistant::config::{seed_from_env, ConfigStore, FileConfigStore, ServerConfig};
use research_assistant::server::{router, AppState};
use research_assistant::{FirecrawlClient, OpenAiClient, ResearchOrchestrator};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("research_assistant=debug,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store = Arc::new(FileConfigStore::open(&config.settings_path));
    seed_from_env(store.as_ref());
    info!("Settings stored at {}", store.path().display());

    let crawler = FirecrawlClient::new(&config.firecrawl_base_url)
        .with_poll_interval(config.firecrawl_poll_interval);

    let store: Arc<dyn ConfigStore> = store;
    let orchestrator = ResearchOrchestrator::new(store, Arc::new(crawler), Arc::new(OpenAiClient::new()));
    let app = router(AppState {
        orchestrator: Arc::new(orchestrator),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Research assistant running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

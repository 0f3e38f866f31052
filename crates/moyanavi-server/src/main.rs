mod configuration;
mod routes;
mod state;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use moyanavi::agent::bedrock::BedrockAgentRuntime;
use moyanavi::config::AgentSettings;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configuration::Settings::new()?;
    let agent_settings = AgentSettings::load(Some(Path::new(".env")))
        .context("AGENT_ID and AGENT_ALIAS_ID must be set in the environment or .env")?;

    let runtime = BedrockAgentRuntime::from_env(agent_settings).await;
    let state = state::AppState::new(Arc::new(runtime));

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

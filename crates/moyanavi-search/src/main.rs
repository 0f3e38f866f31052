use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing_subscriber::EnvFilter;

use moyanavi::config::SearchSettings;
use moyanavi::search::action_group::{ActionGroupRequest, ActionGroupResponse};
use moyanavi::search::tavily::TavilyClient;
use moyanavi::search::{self, SearchProvider};

async fn function_handler(
    provider: &dyn SearchProvider,
    event: LambdaEvent<ActionGroupRequest>,
) -> Result<ActionGroupResponse, Error> {
    let (request, context) = event.into_parts();
    tracing::info!(request_id = %context.request_id, "received action group invocation");

    Ok(search::handle(&request, provider).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch adds its own timestamps and does not render colors
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();

    let settings = SearchSettings::from_env()?;
    tracing::debug!(?settings, "loaded search settings");
    let client = TavilyClient::new(&settings)?;
    let provider: &dyn SearchProvider = &client;

    lambda_runtime::run(service_fn(move |event| async move {
        function_handler(provider, event).await
    }))
    .await
}

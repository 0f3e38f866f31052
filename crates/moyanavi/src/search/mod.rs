//! The search tool the agent runtime calls through its action group.

pub mod action_group;
pub mod body;
pub mod tavily;
pub mod token_counter;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use action_group::{ActionGroupRequest, ActionGroupResponse};

/// A web search backend that turns a query into context for the agent.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_context(&self, query: &str) -> Result<Value, SearchError>;
}

/// Answer one action group invocation: run the query and wrap the result in
/// the envelope the runtime expects. Provider failures are returned as-is.
pub async fn handle(
    request: &ActionGroupRequest,
    provider: &dyn SearchProvider,
) -> Result<ActionGroupResponse, SearchError> {
    let query = request.query()?;
    tracing::info!(
        action_group = %request.action_group,
        function = %request.function,
        "handling search invocation"
    );

    let result = provider.search_context(query).await?;
    Ok(request.respond(body::to_body(&result)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubProvider {
        result: Value,
        queries: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn new(result: Value) -> Self {
            Self {
                result,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        async fn search_context(&self, query: &str) -> Result<Value, SearchError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.result.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SearchProvider for FailingProvider {
        async fn search_context(&self, _query: &str) -> Result<Value, SearchError> {
            Err(SearchError::Api {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn climate_request() -> ActionGroupRequest {
        serde_json::from_value(json!({
            "messageVersion": "1.0",
            "actionGroup": "search",
            "function": "search",
            "parameters": [{"name": "query", "value": "climate policy"}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_handle_end_to_end() {
        let provider = StubProvider::new(json!({"result": "ok"}));

        let response = handle(&climate_request(), &provider).await.unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "messageVersion": "1.0",
                "response": {
                    "actionGroup": "search",
                    "function": "search",
                    "functionResponse": {
                        "responseBody": {"TEXT": {"body": "{\"result\": \"ok\"}"}}
                    }
                }
            })
        );
        assert_eq!(*provider.queries.lock().unwrap(), vec!["climate policy"]);
    }

    #[tokio::test]
    async fn test_handle_missing_query_skips_search() {
        let provider = StubProvider::new(json!({"result": "ok"}));
        let mut request = climate_request();
        request.parameters.clear();

        let err = handle(&request, &provider).await.unwrap_err();

        assert!(matches!(err, SearchError::MissingParameter(_)));
        assert!(provider.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_propagates_provider_error() {
        let err = handle(&climate_request(), &FailingProvider)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Api { status: 500, .. }));
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::token_counter::{TokenCounter, DEFAULT_MAX_TOKENS};
use super::SearchProvider;
use crate::config::SearchSettings;
use crate::errors::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: SearchDepth,
    max_results: u32,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct ContextEntry {
    url: String,
    content: String,
}

/// Client for the Tavily search API.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    host: String,
    depth: SearchDepth,
    max_results: u32,
    max_tokens: usize,
    counter: TokenCounter,
}

impl TavilyClient {
    pub fn new(settings: &SearchSettings) -> Result<Self, SearchError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_key: settings.tavily_api_key.clone(),
            host: settings.tavily_api_host.clone(),
            depth: SearchDepth::Advanced,
            max_results: 10,
            max_tokens: DEFAULT_MAX_TOKENS,
            counter: TokenCounter::new()?,
        })
    }

    async fn post(&self, request: &SearchRequest<'_>) -> Result<SearchResponse, SearchError> {
        let url = format!("{}/search", self.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search_context(&self, query: &str) -> Result<Value, SearchError> {
        let request = SearchRequest {
            query,
            search_depth: self.depth,
            max_results: self.max_results,
            include_answer: false,
            include_raw_content: false,
            include_images: false,
        };
        tracing::debug!(query, depth = ?self.depth, max_results = self.max_results, "searching");

        let response = self.post(&request).await?;
        let context: Vec<ContextEntry> = response
            .results
            .into_iter()
            .map(|hit| ContextEntry {
                url: hit.url,
                content: hit.content,
            })
            .collect();
        let hits = context.len();
        let context = self.counter.take_within(context, self.max_tokens)?;
        tracing::info!(hits, kept = context.len(), "search finished");

        Ok(serde_json::to_value(context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn _setup_mock_server(status: u16, response_body: Value) -> (MockServer, TavilyClient) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("Authorization", "Bearer tvly-test"))
            .and(body_partial_json(json!({
                "query": "climate policy",
                "search_depth": "advanced",
                "max_results": 10
            })))
            .respond_with(ResponseTemplate::new(status).set_body_json(response_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let settings = SearchSettings {
            tavily_api_key: "tvly-test".to_string(),
            tavily_api_host: mock_server.uri(),
        };
        (mock_server, TavilyClient::new(&settings).unwrap())
    }

    #[tokio::test]
    async fn test_search_context_keeps_url_and_content() {
        let (_server, client) = _setup_mock_server(
            200,
            json!({
                "query": "climate policy",
                "answer": null,
                "images": [],
                "results": [
                    {"title": "A", "url": "https://a.example", "content": "気候政策の概要", "score": 0.9},
                    {"title": "B", "url": "https://b.example", "content": "Carbon pricing", "score": 0.7}
                ],
                "response_time": 1.2
            }),
        )
        .await;

        let context = client.search_context("climate policy").await.unwrap();
        assert_eq!(
            context,
            json!([
                {"url": "https://a.example", "content": "気候政策の概要"},
                {"url": "https://b.example", "content": "Carbon pricing"}
            ])
        );
    }

    #[tokio::test]
    async fn test_search_context_fits_token_budget() {
        let results: Vec<Value> = (0..10)
            .map(|i| {
                json!({
                    "title": format!("T{}", i),
                    "url": format!("https://{}.example", i),
                    "content": "word ".repeat(3000),
                    "score": 0.5
                })
            })
            .collect();
        let (_server, client) = _setup_mock_server(200, json!({ "results": results })).await;

        let context = client.search_context("climate policy").await.unwrap();
        let entries = context.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["url"], "https://0.example");

        let counter = TokenCounter::new().unwrap();
        let body = crate::search::body::to_body(&context).unwrap();
        assert!(counter.count_tokens(&body) <= DEFAULT_MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_search_api_error_propagates() {
        let (_server, client) =
            _setup_mock_server(401, json!({"detail": {"error": "Unauthorized"}})).await;

        match client.search_context("climate policy").await {
            Err(SearchError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }
}

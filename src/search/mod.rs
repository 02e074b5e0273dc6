//! Search collaborator client
//!
//! Thin client for a SearXNG-compatible JSON search endpoint
//! (`GET ?q=<query>&format=json`). Only the result URLs feed the extraction
//! pipeline; title and snippet pass through to the caller untouched.

use crate::config::SearchConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// One row from the search collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub url: String,

    #[serde(default)]
    pub title: String,

    /// SearXNG calls the snippet field "content"
    #[serde(rename = "content", default)]
    pub snippet: String,
}

/// Wire shape of the search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Errors from the search collaborator
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search service did not respond: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Search service returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// HTTP client for the search endpoint
pub struct SearchClient {
    client: Client,
    endpoint: Url,
    max_results: usize,
}

impl SearchClient {
    /// Creates a client from the `[search]` configuration section
    ///
    /// The endpoint has already been validated at config load time.
    pub fn from_config(config: &SearchConfig) -> crate::Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .user_agent(format!("pagesift/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            max_results: config.max_results,
        })
    }

    /// Queries the search endpoint and returns the top results
    ///
    /// At most `max-results` rows are returned, in the collaborator's
    /// ranking order.
    pub async fn search(&self, query: &str) -> SearchResult<Vec<SearchHit>> {
        tracing::debug!("Searching for: {}", query);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("format", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;

        let mut hits = parsed.results;
        hits.truncate(self.max_results);

        tracing::debug!("Search returned {} results", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer, max_results: usize) -> SearchClient {
        SearchClient::from_config(&SearchConfig {
            endpoint: format!("{}/search", server.uri()),
            timeout_ms: 1_000,
            max_results,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust web scraping"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"results": [
                    {"url": "https://a.test/", "title": "A", "content": "snippet a"},
                    {"url": "https://b.test/", "title": "B", "content": "snippet b"}
                ]}"#,
            ))
            .mount(&server)
            .await;

        let client = test_client(&server, 5);
        let hits = client.search("rust web scraping").await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://a.test/");
        assert_eq!(hits[0].title, "A");
        assert_eq!(hits[0].snippet, "snippet a");
    }

    #[tokio::test]
    async fn test_search_truncates_to_max_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"results": [
                    {"url": "https://a.test/"},
                    {"url": "https://b.test/"},
                    {"url": "https://c.test/"}
                ]}"#,
            ))
            .mount(&server)
            .await;

        let client = test_client(&server, 2);
        let hits = client.search("anything").await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].url, "https://b.test/");
    }

    #[tokio::test]
    async fn test_search_missing_fields_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"results": [{"url": "https://a.test/"}]}"#),
            )
            .mount(&server)
            .await;

        let client = test_client(&server, 5);
        let hits = client.search("anything").await.unwrap();

        assert_eq!(hits[0].title, "");
        assert_eq!(hits[0].snippet, "");
    }

    #[tokio::test]
    async fn test_search_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server, 5);
        let result = client.search("anything").await;

        assert!(matches!(result, Err(SearchError::Status { status: 503 })));
    }

    #[tokio::test]
    async fn test_search_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let client = test_client(&server, 5);
        let result = client.search("anything").await;

        assert!(matches!(result, Err(SearchError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn test_search_empty_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results": []}"#))
            .mount(&server)
            .await;

        let client = test_client(&server, 5);
        let hits = client.search("anything").await.unwrap();
        assert!(hits.is_empty());
    }
}

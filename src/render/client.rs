//! HTTP client for the headless-render sidecar
//!
//! The sidecar exposes a Splash-style endpoint: `GET <endpoint>?url=<target>`
//! returns the rendered document, and an optional `selector` query parameter
//! restricts the render to the matching subtree. This module handles:
//! - Building the HTTP client with timeouts and compression
//! - Issuing render requests with an optional scope selector
//! - Classifying failures (timeout vs transport vs status vs empty body)

use crate::config::RenderConfig;
use crate::render::{RenderError, RenderResult, RenderedPage, Renderer};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client for talking to the render sidecar
///
/// # Arguments
///
/// * `timeout` - Per-request timeout applied to every render call
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_render_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let user_agent = format!("pagesift/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production [`Renderer`] backed by the render sidecar
pub struct HttpRenderer {
    client: Client,
    endpoint: Url,
}

impl HttpRenderer {
    /// Creates a renderer from an endpoint URL and timeout
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = build_render_client(timeout)?;
        Ok(Self { client, endpoint })
    }

    /// Creates a renderer from the `[render]` configuration section
    ///
    /// The endpoint has already been validated at config load time.
    pub fn from_config(config: &RenderConfig) -> crate::Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let timeout = Duration::from_millis(config.timeout_ms);
        Ok(Self::new(endpoint, timeout)?)
    }

    /// Classifies a transport-level error into a render error
    fn classify_error(url: &str, error: reqwest::Error) -> RenderError {
        if error.is_timeout() {
            RenderError::Timeout {
                url: url.to_string(),
            }
        } else {
            RenderError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, scope: Option<&str>) -> RenderResult<RenderedPage> {
        let mut request = self.client.get(self.endpoint.clone()).query(&[("url", url)]);

        if let Some(selector) = scope {
            request = request.query(&[("selector", selector)]);
        }

        tracing::debug!("Requesting render for {} (scope: {:?})", url, scope);

        let response = request
            .send()
            .await
            .map_err(|e| Self::classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| Self::classify_error(url, e))?;

        if html.trim().is_empty() {
            return Err(RenderError::Empty {
                url: url.to_string(),
            });
        }

        Ok(RenderedPage::new(url, html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_renderer(server: &MockServer) -> HttpRenderer {
        let endpoint = Url::parse(&format!("{}/render.html", server.uri())).unwrap();
        HttpRenderer::new(endpoint, Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn test_build_render_client() {
        let client = build_render_client(Duration::from_secs(10));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_render_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("url", "https://example.com/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>"))
            .mount(&server)
            .await;

        let renderer = test_renderer(&server).await;
        let page = renderer.render("https://example.com/post", None).await.unwrap();

        assert_eq!(page.url, "https://example.com/post");
        assert!(page.html.contains("hi"));
    }

    #[tokio::test]
    async fn test_render_passes_scope_selector() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("url", "https://example.com/post"))
            .and(query_param("selector", "article"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<article>scoped</article>"))
            .mount(&server)
            .await;

        let renderer = test_renderer(&server).await;
        let page = renderer
            .render("https://example.com/post", Some("article"))
            .await
            .unwrap();

        assert!(page.html.contains("scoped"));
    }

    #[tokio::test]
    async fn test_render_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let renderer = test_renderer(&server).await;
        let result = renderer.render("https://example.com/post", None).await;

        assert!(matches!(
            result,
            Err(RenderError::Status { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn test_render_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("   \n  "))
            .mount(&server)
            .await;

        let renderer = test_renderer(&server).await;
        let result = renderer.render("https://example.com/post", None).await;

        assert!(matches!(result, Err(RenderError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_render_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let renderer = test_renderer(&server).await;
        let result = renderer.render("https://example.com/slow", None).await;

        assert!(matches!(result, Err(RenderError::Timeout { .. })));
    }
}

//! Rendered-page acquisition
//!
//! A "rendered page" is the HTML of a URL after JavaScript execution, as
//! produced by an external headless-render sidecar. The sidecar is consumed
//! through the [`Renderer`] trait so the pipeline can be exercised against a
//! scripted renderer in tests; [`HttpRenderer`] is the production
//! implementation.

mod client;

pub use client::{build_render_client, HttpRenderer};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// HTML of a URL after JavaScript execution
///
/// Owned exclusively by one pipeline run and never mutated after creation.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL this page was rendered from
    pub url: String,

    /// The rendered document
    pub html: String,

    /// When the render completed
    pub rendered_at: DateTime<Utc>,
}

impl RenderedPage {
    /// Creates a page stamped with the current time
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            rendered_at: Utc::now(),
        }
    }
}

/// Errors from the render sidecar
///
/// The sidecar is best-effort and unreliable; every variant is recoverable
/// at some level of the pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render timed out for {url}")]
    Timeout { url: String },

    #[error("Render request failed for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Render service returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Render service returned an empty document for {url}")]
    Empty { url: String },
}

/// Result type alias for render operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// A headless-render collaborator
///
/// `scope` restricts the render to the subtree matching a CSS selector,
/// which the re-extraction stage uses to obtain a cleaner document for the
/// already-matched region.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, scope: Option<&str>) -> RenderResult<RenderedPage>;
}

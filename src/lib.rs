//! Pagesift: web pages into model-consumable Markdown
//!
//! This crate implements a content-selection pipeline for AI agents without
//! native web browsing: it renders candidate pages through a headless-render
//! sidecar, picks the DOM region that constitutes "the article" via a
//! priority-ordered selector list, re-renders scoped to that region for a
//! cleaner document, and converts the result to normalized Markdown. Many
//! URLs are processed concurrently with per-URL failure isolation.

pub mod cache;
pub mod config;
pub mod extract;
pub mod markdown;
pub mod pipeline;
pub mod render;
pub mod search;

use thiserror::Error;

/// Main error type for pagesift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for pagesift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{match_region, MatchResult, SelectorRule};
pub use markdown::{to_markdown, MarkdownOptions};
pub use pipeline::{ErrorKind, ExtractionOutcome, Orchestrator, UnitState};
pub use render::{HttpRenderer, RenderError, RenderedPage, Renderer};

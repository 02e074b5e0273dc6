//! Document cache
//!
//! SQLite-backed URL → Markdown cache so repeated fetches of the same page
//! skip the render pipeline entirely. Entries are keyed by a SHA-256 digest
//! of the URL and expire after a configurable TTL.

mod store;

pub use store::DocumentCache;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A cached extraction result
#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub url: String,
    pub markdown: String,

    /// When the document was extracted
    pub fetched_at: DateTime<Utc>,
}

/// Cache-specific errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt timestamp in cache: {0}")]
    Timestamp(String),
}

/// Result type alias for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

//! SQLite document store

use crate::cache::{CacheError, CacheResult, CachedDocument};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;

/// SQL schema for the document cache
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    url_digest TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    markdown TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_fetched_at ON documents(fetched_at);
"#;

/// SQLite-backed URL → Markdown cache with TTL expiry
pub struct DocumentCache {
    conn: Connection,
    ttl: Duration,
}

impl DocumentCache {
    /// Opens (or creates) a cache database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `ttl_seconds` - Seconds before a cached document is stale
    pub fn open(path: &Path, ttl_seconds: i64) -> CacheResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn,
            ttl: Duration::seconds(ttl_seconds),
        })
    }

    /// Creates an in-memory cache (for testing)
    #[cfg(test)]
    pub fn open_in_memory(ttl_seconds: i64) -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn,
            ttl: Duration::seconds(ttl_seconds),
        })
    }

    /// Looks up a fresh cached document for a URL
    ///
    /// Stale entries are treated as misses; they stay on disk until the
    /// next [`DocumentCache::store`] for the same URL or a
    /// [`DocumentCache::purge_stale`] pass.
    pub fn lookup(&self, url: &str) -> CacheResult<Option<CachedDocument>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, markdown, fetched_at FROM documents WHERE url_digest = ?1")?;

        let row = stmt
            .query_row(params![url_digest(url)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .optional()?;

        let Some((url, markdown, fetched_at)) = row else {
            return Ok(None);
        };

        let fetched_at = parse_timestamp(&fetched_at)?;
        if Utc::now() - fetched_at > self.ttl {
            tracing::debug!("Cache entry for {} is stale", url);
            return Ok(None);
        }

        tracing::debug!("Cache hit for {}", url);
        Ok(Some(CachedDocument {
            url,
            markdown,
            fetched_at,
        }))
    }

    /// Stores (or replaces) the extracted Markdown for a URL
    pub fn store(&self, url: &str, markdown: &str) -> CacheResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO documents (url_digest, url, markdown, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![url_digest(url), url, markdown, now],
        )?;
        Ok(())
    }

    /// Deletes every entry older than the TTL
    ///
    /// Returns the number of rows removed.
    pub fn purge_stale(&self) -> CacheResult<usize> {
        let cutoff = (Utc::now() - self.ttl).to_rfc3339();
        let removed = self
            .conn
            .execute("DELETE FROM documents WHERE fetched_at < ?1", params![cutoff])?;

        if removed > 0 {
            tracing::debug!("Purged {} stale cache entries", removed);
        }
        Ok(removed)
    }

    /// Returns the number of entries in the cache, stale included
    pub fn len(&self) -> CacheResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Returns true if the cache holds no entries at all
    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Hex SHA-256 digest used as the primary key for a URL
fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parses an RFC 3339 timestamp stored in the database
fn parse_timestamp(raw: &str) -> CacheResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CacheError::Timestamp(raw.to_string()))
}

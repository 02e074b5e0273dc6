use serde::Deserialize;

/// Main configuration structure for pagesift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub render: RenderConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(rename = "junk-filter", default)]
    pub junk_filter: JunkFilterConfig,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

/// Render sidecar configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Full URL of the headless-render endpoint (e.g. http://localhost:8050/render.html)
    pub endpoint: String,

    /// Per-render request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_render_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of renders in flight at once
    #[serde(rename = "max-concurrent-renders", default = "default_max_concurrent_renders")]
    pub max_concurrent_renders: usize,
}

/// Content-region selection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// CSS selectors tried in order; list position is the priority
    #[serde(default = "default_selector_priority")]
    pub priority: Vec<String>,

    /// Minimum visible word count for a matched region to qualify
    #[serde(rename = "min-words", default = "default_min_words")]
    pub min_words: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            priority: default_selector_priority(),
            min_words: default_min_words(),
        }
    }
}

/// Markdown conversion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    /// Drop images entirely instead of emitting image syntax
    #[serde(rename = "strip-images", default = "default_true")]
    pub strip_images: bool,

    /// Convert cross-host anchors to plain text
    #[serde(rename = "strip-external-links", default = "default_true")]
    pub strip_external_links: bool,

    /// Convert same-host anchors to plain text
    #[serde(rename = "strip-internal-links", default)]
    pub strip_internal_links: bool,

    /// Tags whose subtrees are dropped before conversion
    #[serde(rename = "excluded-tags", default = "default_excluded_tags")]
    pub excluded_tags: Vec<String>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            strip_images: true,
            strip_external_links: true,
            strip_internal_links: false,
            excluded_tags: default_excluded_tags(),
        }
    }
}

/// Residual junk filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JunkFilterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum ratio of letters to non-whitespace characters before a text
    /// run is considered UI residue
    #[serde(rename = "letter-ratio-threshold", default = "default_letter_ratio")]
    pub letter_ratio_threshold: f64,
}

impl Default for JunkFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            letter_ratio_threshold: default_letter_ratio(),
        }
    }
}

/// Search collaborator configuration (SearXNG-compatible JSON endpoint)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint URL
    pub endpoint: String,

    /// Search request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_search_timeout_ms")]
    pub timeout_ms: u64,

    /// How many results feed the extraction pipeline
    #[serde(rename = "max-results", default = "default_max_results")]
    pub max_results: usize,
}

/// Document cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Seconds before a cached document is considered stale
    #[serde(rename = "ttl-seconds", default = "default_cache_ttl")]
    pub ttl_seconds: i64,
}

fn default_true() -> bool {
    true
}

fn default_render_timeout_ms() -> u64 {
    10_000
}

fn default_max_concurrent_renders() -> usize {
    8
}

fn default_min_words() -> usize {
    50
}

fn default_selector_priority() -> Vec<String> {
    [
        "article",
        "main",
        "[role=\"main\"]",
        ".article",
        ".article-content",
        ".page-content",
        ".markdown",
        "#article",
        "#content",
        "#main",
        "#page",
        ".content",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_excluded_tags() -> Vec<String> {
    [
        "nav", "footer", "header", "aside", "script", "style", "noscript", "form", "button",
        "iframe", "svg",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_letter_ratio() -> f64 {
    0.5
}

fn default_search_timeout_ms() -> u64 {
    5_000
}

fn default_max_results() -> usize {
    5
}

fn default_cache_ttl() -> i64 {
    3_600
}

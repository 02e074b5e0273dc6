use crate::config::types::{
    CacheConfig, Config, JunkFilterConfig, MarkdownConfig, RenderConfig, SearchConfig,
    SelectorConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_render_config(&config.render)?;
    validate_selector_config(&config.selectors)?;
    validate_markdown_config(&config.markdown)?;
    validate_junk_filter_config(&config.junk_filter)?;
    if let Some(search) = &config.search {
        validate_search_config(search)?;
    }
    if let Some(cache) = &config.cache {
        validate_cache_config(cache)?;
    }
    Ok(())
}

/// Validates render sidecar configuration
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    validate_http_endpoint(&config.endpoint, "render endpoint")?;

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "render timeout-ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.max_concurrent_renders < 1 || config.max_concurrent_renders > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-renders must be between 1 and 100, got {}",
            config.max_concurrent_renders
        )));
    }

    Ok(())
}

/// Validates the selector priority list
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    if config.priority.is_empty() {
        return Err(ConfigError::Validation(
            "selectors.priority must contain at least one selector".to_string(),
        ));
    }

    for selector in &config.priority {
        if selector.trim().is_empty() {
            return Err(ConfigError::InvalidSelector(
                "selector cannot be empty".to_string(),
            ));
        }

        if Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector(format!(
                "'{}' is not a valid CSS selector",
                selector
            )));
        }
    }

    if config.min_words < 1 {
        return Err(ConfigError::Validation(format!(
            "selectors.min-words must be >= 1, got {}",
            config.min_words
        )));
    }

    Ok(())
}

/// Validates markdown conversion configuration
fn validate_markdown_config(config: &MarkdownConfig) -> Result<(), ConfigError> {
    for tag in &config.excluded_tags {
        if tag.trim().is_empty() {
            return Err(ConfigError::Validation(
                "markdown.excluded-tags entries cannot be empty".to_string(),
            ));
        }

        if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "markdown.excluded-tags entry '{}' is not a tag name",
                tag
            )));
        }
    }

    Ok(())
}

/// Validates junk filter configuration
fn validate_junk_filter_config(config: &JunkFilterConfig) -> Result<(), ConfigError> {
    if config.letter_ratio_threshold <= 0.0 || config.letter_ratio_threshold > 1.0 {
        return Err(ConfigError::Validation(format!(
            "junk-filter.letter-ratio-threshold must be in (0.0, 1.0], got {}",
            config.letter_ratio_threshold
        )));
    }

    Ok(())
}

/// Validates search collaborator configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_http_endpoint(&config.endpoint, "search endpoint")?;

    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "search timeout-ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.max_results < 1 || config.max_results > 20 {
        return Err(ConfigError::Validation(format!(
            "search max-results must be between 1 and 20, got {}",
            config.max_results
        )));
    }

    Ok(())
}

/// Validates document cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "cache.database-path cannot be empty".to_string(),
        ));
    }

    if config.ttl_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "cache.ttl-seconds must be >= 1, got {}",
            config.ttl_seconds
        )));
    }

    Ok(())
}

/// Validates that a string is an absolute http(s) URL
fn validate_http_endpoint(endpoint: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", what, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            what,
            url.scheme()
        )));
    }

    Ok(())
}

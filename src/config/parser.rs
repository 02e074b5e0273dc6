use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pagesift::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Render endpoint: {}", config.render.endpoint);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is used to log which configuration a run was started with.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Successfully loaded configuration and its hash
/// * `Err(ConfigError)` - Failed to load or parse the configuration
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[render]
endpoint = "http://localhost:8050/render.html"
timeout-ms = 5000
max-concurrent-renders = 4

[selectors]
priority = ["article", "main"]
min-words = 40

[markdown]
strip-images = true
strip-external-links = false
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.render.endpoint, "http://localhost:8050/render.html");
        assert_eq!(config.render.timeout_ms, 5000);
        assert_eq!(config.render.max_concurrent_renders, 4);
        assert_eq!(config.selectors.priority.len(), 2);
        assert_eq!(config.selectors.min_words, 40);
        assert!(config.markdown.strip_images);
        assert!(!config.markdown.strip_external_links);
        assert!(config.search.is_none());
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_load_config_applies_defaults() {
        let config_content = r#"
[render]
endpoint = "http://localhost:8050/render.html"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.render.timeout_ms, 10_000);
        assert_eq!(config.render.max_concurrent_renders, 8);
        assert_eq!(config.selectors.min_words, 50);
        assert!(config.selectors.priority.contains(&"article".to_string()));
        assert!(config.markdown.strip_external_links);
        assert!(!config.markdown.strip_internal_links);
        assert!(config.junk_filter.enabled);
    }

    #[test]
    fn test_load_config_with_optional_sections() {
        let config_content = r#"
[render]
endpoint = "http://localhost:8050/render.html"

[search]
endpoint = "http://localhost:8888/search"
max-results = 3

[cache]
database-path = "./pagesift.db"
ttl-seconds = 600
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        let search = config.search.unwrap();
        assert_eq!(search.max_results, 3);
        assert_eq!(search.timeout_ms, 5_000);

        let cache = config.cache.unwrap();
        assert_eq!(cache.database_path, "./pagesift.db");
        assert_eq!(cache.ttl_seconds, 600);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[render]
endpoint = "http://localhost:8050/render.html"
max-concurrent-renders = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}

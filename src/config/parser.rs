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
/// use sumi_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is reported in the run summary so two mirrors can be traced back
/// to the exact configuration that produced them.
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
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchStrategy;
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
[crawler]
root-url = "https://www.example.com/"
max-depth = 2
max-pages = 30
workers = 4
politeness-delay-ms = 1000

[fetcher]
strategy = "http"
request-timeout-secs = 15
max-attempts = 5
backoff-step-ms = 500

[extractor]
link-exclusions = [".pdf"]

[output]
directory = "./mirror"
summary-path = "./mirror-report.md"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.max_pages, 30);
        assert_eq!(config.crawler.workers, 4);
        assert_eq!(config.fetcher.strategy, FetchStrategy::Http);
        assert_eq!(config.fetcher.max_attempts, 5);
        assert_eq!(config.extractor.link_exclusions, vec![".pdf".to_string()]);
        assert_eq!(config.output.directory, "./mirror");
        assert_eq!(
            config.output.summary_path.as_deref(),
            Some("./mirror-report.md")
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(
            r#"
[crawler]
root-url = "https://example.com/"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.max_pages, 50);
        assert_eq!(config.crawler.workers, 1);
        assert_eq!(config.crawler.politeness_delay_ms, 500);
        assert_eq!(config.fetcher.request_timeout_secs, 30);
        assert_eq!(config.fetcher.max_attempts, 3);
        assert_eq!(config.fetcher.backoff_step_ms, 2000);
        assert_eq!(config.extractor.link_exclusions.len(), 7);
        assert_eq!(config.output.directory, "./public");
        assert!(config.output.summary_path.is_none());
    }

    #[test]
    fn test_browser_strategy_parses() {
        let config = toml::from_str::<Config>(
            r#"
[crawler]
root-url = "https://example.com/"

[fetcher]
strategy = "browser"
headless = false
"#,
        )
        .unwrap();

        assert_eq!(config.fetcher.strategy, FetchStrategy::Browser);
        assert!(!config.fetcher.headless);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/mirror.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_root_url_is_parse_error() {
        let result = parse_config("[crawler]\nmax-depth = 2\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
root-url = "https://example.com/"
max-pages = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
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

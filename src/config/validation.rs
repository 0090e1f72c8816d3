use crate::config::types::{Config, CrawlerConfig, IndexConfig, SelectorConfig, SiteConfig};
use crate::extract::compile_selector;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_selector_config(&config.selectors)?;
    validate_index_config(&config.index)?;
    config.schema().compile()?;
    Ok(())
}

/// Validates the crawled site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.base_url)?;

    if !config.root_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "root-path must start with '/', got '{}'",
            config.root_path
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.detail_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "detail-retries must be <= 10, got {}",
            config.detail_retries
        )));
    }

    Ok(())
}

/// Validates listing selectors
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.year_links,
        &config.issue_links,
        &config.result_links,
        &config.next_links,
    ] {
        compile_selector(selector)?;
    }

    if config.next_label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "next-label cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates search index configuration
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    validate_http_url("index endpoint", &config.endpoint)?;
    validate_index_name(&config.name)?;

    if config.batch_size < 1 || config.batch_size > 10_000 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be between 1 and 10000, got {}",
            config.batch_size
        )));
    }

    if config.password.is_some() && config.username.is_none() {
        return Err(ConfigError::Validation(
            "index password given without a username".to_string(),
        ));
    }

    Ok(())
}

/// Index names must be lowercase and free of separators
fn validate_index_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "index name cannot be empty".to_string(),
        ));
    }

    if name.starts_with(['_', '-', '+']) {
        return Err(ConfigError::Validation(format!(
            "index name '{}' cannot start with '_', '-' or '+'",
            name
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ConfigError::Validation(format!(
            "index name '{}' must contain only lowercase letters, digits, '-', '_' and '.'",
            name
        )));
    }

    Ok(())
}

fn validate_http_url(what: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}

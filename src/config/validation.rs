use crate::config::types::{ExtractorKind, GraphConfig, Settings};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates a freshly built graph config
pub fn validate_graph_config(config: &GraphConfig) -> Result<(), ConfigError> {
    // Fan-out templates carry no URL of their own
    if !config.url.is_empty() {
        validate_target_url(&config.url)?;
    }

    if config.timeout.is_zero() {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    if let Some(temperature) = config.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }
    }

    if config.max_tokens == Some(0) {
        return Err(ConfigError::Validation(
            "max_tokens must be >= 1 when set".to_string(),
        ));
    }

    if config.rate_limit == Some(0) {
        return Err(ConfigError::Validation(
            "rate_limit must be >= 1 request per second when set".to_string(),
        ));
    }

    if let Some(selector) = &config.css_selector {
        Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    }

    for name in config.headers.keys() {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "header names cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a settings file
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.defaults.timeout == 0 {
        return Err(ConfigError::Validation(
            "defaults.timeout must be at least 1 second".to_string(),
        ));
    }

    if settings.http.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "http.user-agent cannot be empty".to_string(),
        ));
    }

    if settings.http.max_body_bytes == 0 {
        return Err(ConfigError::Validation(
            "http.max-body-bytes must be >= 1".to_string(),
        ));
    }

    Url::parse(&settings.browser.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;

    if settings.extractor.kind == ExtractorKind::Llm {
        Url::parse(&settings.extractor.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid extractor base-url: {}", e)))?;

        if settings.extractor.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "extractor.model cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&settings.extractor.temperature) {
            return Err(ConfigError::Validation(format!(
                "extractor.temperature must be between 0.0 and 2.0, got {}",
                settings.extractor.temperature
            )));
        }
    }

    Ok(())
}

/// Checks that a target URL is absolute and uses HTTP(S)
fn validate_target_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid target URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Target URL '{}' must use http or https",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Target URL '{}' has no host",
            raw
        )));
    }

    Ok(())
}

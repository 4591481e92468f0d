use crate::config::types::{
    AggregatorConfig, Config, EndpointConfig, RetryConfig, TimeoutConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on pages handed to the crawler in one run
const MAX_CRAWL_LIMIT: usize = 3;

/// Upper bound on retries for a single external call
const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_aggregator_config(&config.aggregator)?;
    validate_retry_config(&config.retry)?;
    validate_timeout_config(&config.timeouts)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_endpoints(&config.endpoints)?;
    Ok(())
}

fn validate_aggregator_config(config: &AggregatorConfig) -> Result<(), ConfigError> {
    if config.crawl_limit < 1 || config.crawl_limit > MAX_CRAWL_LIMIT {
        return Err(ConfigError::Validation(format!(
            "crawl_limit must be between 1 and {}, got {}",
            MAX_CRAWL_LIMIT, config.crawl_limit
        )));
    }
    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }
    Ok(())
}

fn validate_timeout_config(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("request_ms", config.request_ms),
        ("fetch_ms", config.fetch_ms),
        ("render_ms", config.render_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{} must be greater than zero",
                name
            )));
        }
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_endpoints(config: &EndpointConfig) -> Result<(), ConfigError> {
    for (name, endpoint) in [
        ("search", &config.search),
        ("academic", &config.academic),
        ("news", &config.news),
        ("registry", &config.registry),
        ("encyclopedia", &config.encyclopedia),
    ] {
        let url = Url::parse(endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid {} endpoint '{}': {}", name, endpoint, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} endpoint '{}' must use http or https",
                name, endpoint
            )));
        }
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

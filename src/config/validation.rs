use crate::config::types::{Config, DetailsConfig, EnumeratorConfig, OutputConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_enumerator_config(&config.enumerator)?;
    validate_details_config(&config.details)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the search URL and price partitioning
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    if config.bucket_width == 0 {
        return Err(ConfigError::Validation(
            "bucket_width must be greater than 0".to_string(),
        ));
    }

    if config.start_price >= config.max_price {
        return Err(ConfigError::Validation(format!(
            "start_price ({}) must be below max_price ({})",
            config.start_price, config.max_price
        )));
    }

    if config.empty_bucket_threshold < 1 {
        return Err(ConfigError::Validation(
            "empty_bucket_threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates scroll loop limits
fn validate_enumerator_config(config: &EnumeratorConfig) -> Result<(), ConfigError> {
    if config.no_new_id_threshold < 1 {
        return Err(ConfigError::Validation(
            "no_new_id_threshold must be >= 1".to_string(),
        ));
    }

    if config.max_steps < 1 {
        return Err(ConfigError::Validation(
            "max_steps must be >= 1".to_string(),
        ));
    }

    if config.first_result_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "first_result_timeout_ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the detail fetch pool
fn validate_details_config(config: &DetailsConfig) -> Result<(), ConfigError> {
    if let Some(workers) = config.max_workers {
        if !(1..=256).contains(&workers) {
            return Err(ConfigError::Validation(format!(
                "max_workers must be between 1 and 256, got {}",
                workers
            )));
        }
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty strings".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.listings_path.is_empty() {
        return Err(ConfigError::Validation(
            "listings_path cannot be empty".to_string(),
        ));
    }

    if config.merged_path.is_empty() {
        return Err(ConfigError::Validation(
            "merged_path cannot be empty".to_string(),
        ));
    }

    if matches!(config.database_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "database_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

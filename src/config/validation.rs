//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check URLs parse and can be joined against
//! - Validate value ranges (timeouts > 0, bounded rate-limit interval)
//!
//! Returns all validation errors, not just the first.

use std::fmt;
use url::Url;

use crate::config::schema::StatsConfig;
use crate::resilience::rate_limit::MAX_INTERVAL;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration.
pub fn validate_config(config: &StatsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_base_url(&mut errors, "api.base_url", &config.api.base_url);
    check_base_url(&mut errors, "api.content_url", &config.api.content_url);

    if let Some(proxy) = &config.transport.proxy {
        if Url::parse(proxy).is_err() {
            errors.push(ValidationError::new("transport.proxy", format!("'{proxy}' is not a URL")));
        }
    }

    if config.transport.timeout_secs == 0 {
        errors.push(ValidationError::new("transport.timeout_secs", "must be greater than 0"));
    }

    if u128::from(config.rate_limit.interval_ms) > MAX_INTERVAL.as_millis() {
        errors.push(ValidationError::new(
            "rate_limit.interval_ms",
            format!("must be at most {}", MAX_INTERVAL.as_millis()),
        ));
    }

    if let (Some(delay), Some(max)) = (config.retries.delay_ms, config.retries.max_delay_ms) {
        if max < delay {
            errors.push(ValidationError::new(
                "retries.max_delay_ms",
                format!("{max} is smaller than delay_ms ({delay})"),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::new(field, format!("unsupported scheme '{}'", url.scheme())));
        }
        Ok(_) if !value.ends_with('/') => {
            errors.push(ValidationError::new(field, "must end with '/'"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new(field, e.to_string())),
    }
}

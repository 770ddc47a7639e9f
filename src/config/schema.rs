//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the fetcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StatsConfig {
    /// Upstream API locations.
    pub api: ApiConfig,

    /// HTTP client settings.
    pub transport: TransportConfig,

    /// Outbound rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Retry policy for upstream requests.
    pub retries: RetryConfig,

    /// Batch lookup settings.
    pub batch: BatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream API locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the JSON API. Must end with `/`.
    pub base_url: String,

    /// Base URL for user content (avatars). Must end with `/`.
    pub content_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ch.tetr.io/api/".to_string(),
            content_url: "https://tetr.io/user-content/".to_string(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Optional proxy for all outbound requests (e.g., "http://127.0.0.1:7890").
    pub proxy: Option<String>,

    /// Total request timeout in seconds.
    pub timeout_secs: u64,

    /// User-Agent header.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_secs: 30,
            user_agent: concat!("tsl-stats/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Outbound rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum interval between two upstream requests, in milliseconds.
    pub interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request (0 behaves like 1).
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds. `None` retries immediately.
    pub delay_ms: Option<u64>,

    /// Switch the delay to exponential backoff with jitter, capped at this
    /// many milliseconds. Ignored when `delay_ms` is unset.
    pub max_delay_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: None,
            max_delay_ms: None,
        }
    }
}

/// Batch lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Attempts per user when a lookup fails with a request error.
    pub max_attempts: u32,

    /// Download avatars alongside stats.
    pub avatars: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            avatars: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

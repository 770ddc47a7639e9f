//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → StatsConfig (validated, immutable)
//!     → consumed once when the Fetcher is built
//! ```
//!
//! # Design Decisions
//! - Config is fixed at construction; nothing is runtime-mutable
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, BatchConfig, ObservabilityConfig, RateLimitConfig, RetryConfig, StatsConfig,
    TransportConfig,
};
pub use validation::{validate_config, ValidationError};

//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → in-flight lookups cancelled → partial results reported
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

//! # Observability
//!
//! Structured logging setup for binaries embedding the crate. Library code only
//! emits `tracing` events; installing a subscriber is left to the entry point.

pub mod logging;

pub use logging::{init_logging, LoggingConfig};

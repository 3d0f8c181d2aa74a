//! Shared utilities for toolhost
//!
//! Logging setup and the application configuration shared by the samples.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, ProviderKind};
pub use logging::init_tracing;

//! Configuration module for the uniseg runtime.
//!
//! This module provides layered configuration loading (files, environment,
//! programmatic defaults) and validation for logging and export settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{ExportConfig, LogFormat, LogOutput, LoggingConfig, SpanEventConfig, UnisegConfig};
pub use validation::validate_config;

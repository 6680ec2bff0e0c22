//! Runtime error types.

use thiserror::Error;
use uniseg_core::SerializeFailed;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// No exporter is installed under this name.
    #[error("Unknown adapter: {0}")]
    UnknownAdapter(String),

    /// No default adapter is configured and more than one is installed.
    #[error("No default adapter: configure export.default_adapter")]
    NoDefaultAdapter,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serialize(#[from] SerializeFailed),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

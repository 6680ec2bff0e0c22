//! Uniseg Runtime - configuration, logging and platform orchestration.
//!
//! This crate provides:
//! - Layered configuration (`uniseg.toml`, `UNISEG_*` environment variables)
//! - Logging setup driven by that configuration
//! - [`UnisegRuntime`], which installs platform adapters and routes
//!   recognition and export through one set of registries
//!
//! ```rust,ignore
//! use uniseg_runtime::{ConfigLoader, UnisegRuntime};
//!
//! let runtime = UnisegRuntime::builder(ConfigLoader::new().load()?)
//!     .adapter(OneBotAdapter::new())
//!     .custom_register("music", |origin| {
//!         Some(Custom::new("music", origin.data().into()))
//!     })
//!     .build()?;
//!
//! let native = runtime.export("onebot", &message).await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, UnisegConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, UnisegRuntime};

pub use tracing;
pub use tracing_subscriber;

/// Logging macros for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}

//! # Uniseg
//!
//! One message model for many chat platforms.
//!
//! ## Overview
//!
//! Every platform speaks its own message format: CQ codes, XML-like
//! elements, JSON arrays. Uniseg recognizes native segments into one
//! canonical set ([`core::Segment`]), lets application code work on that
//! set, and exports it back into whichever platform a reply goes to.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌─────────────────────────────┐    ┌──────────────┐
//! │ OneBot CQ    │───▶│         UnisegRuntime       │───▶│ Satori       │
//! │ Satori XML   │    │ PatternRegistry (recognize) │    │ OneBot       │
//! │ ...          │    │ ExporterRegistry (export)   │    │ ...          │
//! └──────────────┘    └─────────────────────────────┘    └──────────────┘
//! ```
//!
//! - **Core**: canonical segments, the text style engine and the
//!   recognition/export protocols
//! - **Adapters**: one builder and one exporter per platform
//! - **Runtime**: configuration, logging and the registries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use uniseg::prelude::*;
//! use uniseg::onebot::{OneBotAdapter, OneBotMessage, parse_cq_string};
//! use uniseg::satori::SatoriAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RuntimeError> {
//!     let runtime = UnisegRuntime::builder(ConfigLoader::new().load()?)
//!         .adapter(OneBotAdapter::new())
//!         .adapter(SatoriAdapter::new())
//!         .build()?;
//!
//!     let incoming = OneBotMessage::from_segments(parse_cq_string("hi [CQ:at,qq=10001]"));
//!     let uni = runtime.recognize_message(&incoming);
//!     let reply = uni + Text::new(" welcome").marked(1, 8, ["b"]);
//!
//!     let native = runtime.export("satori", &reply).await?;
//!     println!("{}", native.extract_plain_text());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `onebot` *(default)*: OneBot v11 adapter
//! - `satori` *(default)*: Satori adapter
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use uniseg_core as core;
pub use uniseg_runtime as runtime;

#[cfg(feature = "onebot")]
pub use uniseg_adapter_onebot as onebot;
#[cfg(feature = "satori")]
pub use uniseg_adapter_satori as satori;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use uniseg::prelude::*;
/// ```
pub mod prelude {
    // Runtime
    pub use uniseg_runtime::{ConfigLoader, RuntimeError, UnisegConfig, UnisegRuntime};

    // Canonical model
    pub use uniseg_core::prelude::*;
    pub use uniseg_core::{
        AtFlag, ForwardNode, MediaFields, MessageContent, NativeMessage, Origin, ReferenceContent,
        SerializeFailed,
    };

    // Extension points
    pub use uniseg_core::{Condition, ErasedExporter, UniAdapter, UniPattern};
}

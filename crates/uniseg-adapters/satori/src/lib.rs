//! # Uniseg Adapter for Satori
//!
//! Binds Satori message elements to the canonical segment layer.
//!
//! ## Overview
//!
//! - [`model`]: Satori elements and their markup rendering
//! - [`StyleRegistry`]: resolves canonical style names to presentation
//!   elements; extend it to support custom styles
//! - [`SatoriMessageBuilder`]: Satori → canonical
//! - [`SatoriMessageExporter`]: canonical → Satori
//! - [`SatoriAdapter`]: installs both into the registries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use uniseg_adapter_satori::{Element, SatoriAdapter, StyleTag};
//! use uniseg_core::{ExporterRegistry, PatternRegistry, UniAdapter};
//!
//! let adapter = SatoriAdapter::new()
//!     .with_style("title", |children| Element::style(StyleTag::Bold, children));
//!
//! let mut patterns = PatternRegistry::new();
//! let mut exporters = ExporterRegistry::new();
//! adapter.install(&mut patterns, &mut exporters);
//! ```
//!
//! ## Element Mapping
//!
//! | Satori | Canonical |
//! |--------|-----------|
//! | text, `<b>`, `<i>`, ... , `<br/>` | `Text` with styles |
//! | `<at id>` / `<at role>` / `<sharp>` | `At` (user / role / channel) |
//! | `<at type="all">` / `<at type="here">` | `AtAll` |
//! | `<img>` / `<audio>` / `<video>` / `<file>` | media (`Voice` exports as `<audio>`) |
//! | `<quote>` | `Reply` |
//! | `<message>` | `Reference` |
//! | `<a>`, `<author>` | `Other` |

mod adapter;
mod builder;
mod exporter;
pub mod model;
mod style;

pub use adapter::SatoriAdapter;
pub use builder::SatoriMessageBuilder;
pub use exporter::SatoriMessageExporter;
pub use model::{Element, SatoriMessage, StyleTag};
pub use style::{StyleHandler, StyleRegistry};

/// Platform identifier of this adapter.
pub const ADAPTER_NAME: &str = "satori";

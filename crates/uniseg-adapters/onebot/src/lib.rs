//! # Uniseg Adapter for OneBot v11
//!
//! Binds the OneBot v11 message format to the canonical segment layer.
//!
//! ## Overview
//!
//! - [`model`]: OneBot segments in array form, plus CQ-code parsing and
//!   rendering for the legacy string form
//! - [`OneBotMessageBuilder`]: OneBot → canonical
//! - [`OneBotMessageExporter`]: canonical → OneBot
//! - [`OneBotAdapter`]: installs both into the registries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use uniseg_adapter_onebot::{OneBotAdapter, OneBotMessage, parse_cq_string};
//! use uniseg_core::{ExporterRegistry, PatternRegistry, UniAdapter};
//!
//! let mut patterns = PatternRegistry::new();
//! let mut exporters = ExporterRegistry::new();
//! OneBotAdapter::new().install(&mut patterns, &mut exporters);
//!
//! let native = OneBotMessage::from_segments(parse_cq_string("Hi [CQ:face,id=178]"));
//! let uni = patterns.recognize_message(&native);
//! ```
//!
//! ## Segment Mapping
//!
//! | OneBot | Canonical |
//! |--------|-----------|
//! | `text` | `Text` (styles are dropped on export) |
//! | `face` | `Emoji` |
//! | `image` / `record` / `video` | `Image` / `Voice` / `Video` (`Audio` exports as `record`) |
//! | `at` | `At` (user only), `AtAll` for `qq=all` |
//! | `reply` | `Reply` |
//! | `forward` / `node` | `Reference` |
//! | `xml` / `json` | `Hyper` |
//! | `poke` | `Other` |

mod adapter;
mod builder;
mod exporter;
pub mod model;

pub use adapter::OneBotAdapter;
pub use builder::OneBotMessageBuilder;
pub use exporter::OneBotMessageExporter;
pub use model::{CqCode, OneBotMessage, Segment, parse_cq_string};

/// Platform identifier of this adapter.
pub const ADAPTER_NAME: &str = "onebot";

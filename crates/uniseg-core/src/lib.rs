//! # Uniseg Core
//!
//! The platform-agnostic message layer of uniseg.
//!
//! This crate defines one canonical representation of chat content and the
//! protocols that bind platform adapters to it.
//!
//! ## Building Blocks
//!
//! ### Segment Model
//!
//! - **Segments**: the canonical variants ([`Segment`]), from styled [`Text`]
//!   to media, replies, forward bundles and user-defined [`Custom`] content
//! - **Style engine**: interval merge and nested-markup rendering on [`Text`]
//! - **Container**: [`UniMessage`], an ordered sequence with `+` concatenation
//!
//! ### Native Side
//!
//! - **Native messages**: [`MessageSegment`] and [`Message<S>`] for platform
//!   formats, with type-erased views ([`Origin`], [`NativeMessage`])
//!
//! ### Conversion
//!
//! - **Recognition**: [`PatternRegistry`] turns native segments into canonical
//!   ones, falling back to [`Other`]
//! - **Export**: [`MessageExporter`] turns canonical segments into one
//!   platform's format; [`ExporterRegistry`] holds one per platform
//! - **Media**: [`fetch_media`] over a platform's [`MediaFetcher`]
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────┐   ┌─────────────────┐   ┌────────────┐   ┌──────────────────┐   ┌──────────┐
//! │  native  │──▶│ PatternRegistry │──▶│ UniMessage │──▶│ MessageExporter  │──▶│  native  │
//! │ segments │   │   (recognize)   │   │ (user code)│   │ (per platform)   │   │ message  │
//! └──────────┘   └─────────────────┘   └────────────┘   └──────────────────┘   └──────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use uniseg_core::prelude::*;
//!
//! let mut greeting = Text::new("hello world");
//! greeting.mark(0, 5, ["b"]).mark(3, 8, ["b"]);
//! assert_eq!(greeting.to_string(), "<b>hello wo</b>rld");
//!
//! let msg = greeting + At::user("10001");
//! let native = exporter.export(&msg, false).await?;
//! ```

pub mod adapter;
pub mod error;
pub mod export;
pub mod fetch;
pub mod message;
pub mod native;
pub mod pattern;
pub mod segment;
pub mod sniff;

pub use adapter::UniAdapter;
pub use error::{ExportResult, FetchError, FetchResult, MediaError, SerializeFailed};
pub use export::{ErasedExporter, ExporterRegistry, MessageExporter};
pub use fetch::{MediaFetcher, fetch_media};
pub use message::UniMessage;
pub use native::{ErasedMessage, Message, MessageSegment, NativeMessage, Origin, RawSegment};
pub use pattern::{
    BuilderPattern, Condition, CustomPattern, FnPattern, MessageBuilder, PatternRegistry,
    UniPattern,
};
pub use segment::{
    At, AtAll, AtFlag, Audio, Custom, CustomNode, Emoji, File, ForwardNode, Hyper, HyperFormat,
    Image, MediaFields, MessageContent, Other, RefNode, Reference, ReferenceContent,
    ResourceSource, Reply, Segment, SegmentKind, Text, Video, Voice,
};
pub use sniff::{FileInfo, sniff};

/// Prelude for common imports.
pub mod prelude {
    pub use super::export::MessageExporter;
    pub use super::message::UniMessage;
    pub use super::native::{Message, MessageSegment};
    pub use super::pattern::MessageBuilder;
    pub use super::segment::{
        At, AtAll, Audio, Custom, CustomNode, Emoji, File, Hyper, Image, RefNode, Reference, Reply,
        Segment, SegmentKind, Text, Video, Voice,
    };
}

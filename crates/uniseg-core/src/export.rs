//! Canonical → native export.
//!
//! Each platform provides one [`MessageExporter`]. Dispatch is by variant: the
//! exporter declares up front which kinds it handles ([`MessageExporter::handles`])
//! and implements the matching methods. Everything else goes through a fixed
//! chain:
//!
//! 1. [`Custom`] segments export themselves ([`Custom::export_as`])
//! 2. [`Other`] segments pass through when they already wrap this platform's
//!    native type
//! 3. with `fallback` enabled, the segment's plain-text form is sent instead
//! 4. otherwise [`SerializeFailed`] is returned
//!
//! A handled kind whose method fails is never downgraded: its error is
//! returned as is.
//!
//! [`Other`]: crate::segment::Other

use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::error::{ExportResult, SerializeFailed};
use crate::message::UniMessage;
use crate::native::{Message, MessageSegment, NativeMessage};
use crate::segment::{
    At, AtAll, Custom, Emoji, Hyper, MediaFields, Reference, Reply, Segment, SegmentKind, Text,
};

// ============================================================================
// Exporter Trait
// ============================================================================

/// Exports canonical segments into one platform's native segments.
///
/// Every per-variant method defaults to [`SerializeFailed`], so an exporter
/// only writes the methods for the kinds it lists in
/// [`handles`](Self::handles).
#[async_trait]
pub trait MessageExporter: Send + Sync + 'static {
    /// The platform's native segment type.
    type Segment: MessageSegment;

    /// The platform identifier.
    fn adapter(&self) -> &'static str;

    /// Canonical kinds with a dedicated method.
    fn handles(&self) -> &'static [SegmentKind];

    async fn text(&self, seg: &Text) -> ExportResult<Vec<Self::Segment>> {
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    async fn at(&self, seg: &At) -> ExportResult<Vec<Self::Segment>> {
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    async fn at_all(&self, seg: &AtAll) -> ExportResult<Vec<Self::Segment>> {
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    async fn emoji(&self, seg: &Emoji) -> ExportResult<Vec<Self::Segment>> {
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    /// Exports any resource-carrying segment; `media` are its shared fields.
    async fn media(&self, seg: &Segment, media: &MediaFields) -> ExportResult<Vec<Self::Segment>> {
        let _ = media;
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    async fn reply(&self, seg: &Reply) -> ExportResult<Vec<Self::Segment>> {
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    async fn reference(&self, seg: &Reference) -> ExportResult<Vec<Self::Segment>> {
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    async fn hyper(&self, seg: &Hyper) -> ExportResult<Vec<Self::Segment>> {
        Err(SerializeFailed::new(self.adapter(), seg.clone()))
    }

    /// Exports one segment through the dispatch chain.
    async fn export_segment(
        &self,
        seg: &Segment,
        fallback: bool,
    ) -> ExportResult<Vec<Self::Segment>> {
        let adapter = self.adapter();
        let kind = seg.kind();
        trace!(adapter, kind = %kind, "Exporting segment");

        if self.handles().contains(&kind) {
            return match seg {
                Segment::Text(text) => self.text(text).await,
                Segment::At(at) => self.at(at).await,
                Segment::AtAll(at_all) => self.at_all(at_all).await,
                Segment::Emoji(emoji) => self.emoji(emoji).await,
                Segment::Reply(reply) => self.reply(reply).await,
                Segment::Reference(reference) => self.reference(reference).await,
                Segment::Hyper(hyper) => self.hyper(hyper).await,
                other => match other.media() {
                    Some(media) => self.media(other, media).await,
                    None => Err(SerializeFailed::new(adapter, other.clone())),
                },
            };
        }

        let native = match seg {
            Segment::Custom(custom) => export_custom::<Self::Segment>(custom, adapter),
            Segment::Other(other) => other.raw.downcast_ref::<Self::Segment>().cloned(),
            _ => None,
        };
        if let Some(native) = native {
            return Ok(vec![native]);
        }

        if fallback {
            warn!(adapter, kind = %kind, "Segment has no native form, sending plain text");
            return Ok(vec![<Self::Segment as MessageSegment>::text(
                seg.to_string(),
            )]);
        }
        Err(SerializeFailed::new(adapter, seg.clone()))
    }

    /// Exports a canonical sequence into a native message, preserving order.
    async fn export(
        &self,
        segments: &[Segment],
        fallback: bool,
    ) -> ExportResult<Message<Self::Segment>> {
        let mut message = Message::new();
        for seg in segments {
            message.extend(self.export_segment(seg, fallback).await?);
        }
        Ok(message)
    }
}

fn export_custom<S: MessageSegment>(custom: &Custom, adapter: &str) -> Option<S> {
    let native = custom.export_as::<S>(adapter);
    if native.is_none() {
        trace!(adapter, mstype = %custom.mstype, "Custom segment declined to export");
    }
    native
}

// ============================================================================
// Type Erasure
// ============================================================================

/// Object-safe view of a [`MessageExporter`].
///
/// Lets exporters of different platforms live in one [`ExporterRegistry`].
pub trait ErasedExporter: Send + Sync {
    /// The platform identifier.
    fn name(&self) -> &'static str;

    /// Exports a canonical message into a type-erased native message.
    fn export_native<'a>(
        &'a self,
        message: &'a UniMessage,
        fallback: bool,
    ) -> BoxFuture<'a, ExportResult<NativeMessage>>;
}

impl<E: MessageExporter> ErasedExporter for E {
    fn name(&self) -> &'static str {
        self.adapter()
    }

    fn export_native<'a>(
        &'a self,
        message: &'a UniMessage,
        fallback: bool,
    ) -> BoxFuture<'a, ExportResult<NativeMessage>> {
        Box::pin(async move {
            self.export(message, fallback)
                .await
                .map(NativeMessage::from)
        })
    }
}

/// Exporters keyed by platform identifier.
#[derive(Default, Clone)]
pub struct ExporterRegistry {
    exporters: IndexMap<&'static str, Arc<dyn ErasedExporter>>,
}

impl ExporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an exporter, replacing any previous one for the same platform.
    pub fn register<E: MessageExporter>(&mut self, exporter: E) -> &mut Self {
        let name = exporter.adapter();
        if self.exporters.insert(name, Arc::new(exporter)).is_some() {
            warn!(adapter = name, "Replaced existing exporter");
        } else {
            debug!(adapter = name, "Registered exporter");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ErasedExporter>> {
        self.exporters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.exporters.contains_key(name)
    }

    /// Registered platform identifiers, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.exporters.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }
}

impl Debug for ExporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterRegistry")
            .field("exporters", &self.exporters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::Origin;
    use crate::native::tests::Probe;
    use crate::segment::{Image, Other, ResourceSource};
    use serde_json::json;

    struct ProbeExporter;

    #[async_trait]
    impl MessageExporter for ProbeExporter {
        type Segment = Probe;

        fn adapter(&self) -> &'static str {
            "probe"
        }

        fn handles(&self) -> &'static [SegmentKind] {
            &[SegmentKind::Text, SegmentKind::Image]
        }

        async fn text(&self, seg: &Text) -> ExportResult<Vec<Probe>> {
            match seg.extract_most_style() {
                None => Ok(vec![Probe::text(seg.text.clone())]),
                Some(style) => Err(SerializeFailed::style(self.adapter(), style, seg.clone())),
            }
        }

        async fn media(&self, seg: &Segment, media: &MediaFields) -> ExportResult<Vec<Probe>> {
            match media.resolve() {
                Some(ResourceSource::Url(url)) => Ok(vec![Probe::Tagged("url", json!(url))]),
                Some(ResourceSource::Path(_)) => Ok(vec![Probe::Tagged("path", json!(null))]),
                Some(ResourceSource::Raw { mimetype, .. }) => {
                    Ok(vec![Probe::Tagged("raw", json!(mimetype))])
                }
                None => Err(SerializeFailed::new(self.adapter(), seg.clone())),
            }
        }
    }

    #[tokio::test]
    async fn test_export_dispatches_by_variant() {
        let msg = "hi " + Image::from_url("https://a.b/c.png");
        let native = ProbeExporter.export(&msg, false).await.unwrap();
        assert_eq!(
            native.into_segments(),
            vec![
                Probe::text("hi "),
                Probe::Tagged("url", json!("https://a.b/c.png")),
            ]
        );
    }

    #[tokio::test]
    async fn test_unmapped_style_fails_with_style() {
        let text = Text::new("hi").marked(0, 2, ["blink"]);
        let err = ProbeExporter
            .export(&[Segment::from(text.clone())], true)
            .await
            .unwrap_err();
        assert_eq!(err.style.as_deref(), Some("blink"));
        assert_eq!(*err.segment, Segment::from(text));
    }

    #[tokio::test]
    async fn test_unhandled_kind_fails_or_falls_back() {
        let msg = UniMessage::from(At::user("1"));
        let err = ProbeExporter.export(&msg, false).await.unwrap_err();
        assert_eq!(err.kind, SegmentKind::At);
        assert_eq!(err.adapter, "probe");

        let native = ProbeExporter.export(&msg, true).await.unwrap();
        assert_eq!(native.into_segments(), vec![Probe::text("[at]")]);
    }

    #[tokio::test]
    async fn test_custom_and_other_pass_through() {
        let custom = Custom::new("music", json!({"id": "1"}))
            .export_to("probe", |seg| Some(Probe::Tagged("music", seg.content.clone())));
        let other = Other::new(Origin::new(Probe::Tagged("poke", json!({}))));
        let msg = UniMessage::from(custom) + other;

        let native = ProbeExporter.export(&msg, false).await.unwrap();
        assert_eq!(
            native.into_segments(),
            vec![
                Probe::Tagged("music", json!({"id": "1"})),
                Probe::Tagged("poke", json!({})),
            ]
        );
    }

    #[tokio::test]
    async fn test_resource_priority_and_missing_source() {
        let both = Image::new(
            MediaFields::new(Image::DEFAULT_NAME)
                .with_url("https://a.b/c.png")
                .with_path("/tmp/c.png"),
        );
        let native = ProbeExporter.export(&[Segment::from(both)], false).await.unwrap();
        assert_eq!(native[0], Probe::Tagged("url", json!("https://a.b/c.png")));

        let raw = Image::from_raw(&b"\x89PNG\r\n\x1a\n"[..]);
        let native = ProbeExporter.export(&[Segment::from(raw)], false).await.unwrap();
        assert_eq!(native[0], Probe::Tagged("raw", json!("image/png")));

        let empty = Image::new(MediaFields::new(Image::DEFAULT_NAME));
        let err = ProbeExporter
            .export(&[Segment::from(empty)], true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SegmentKind::Image);
    }

    #[tokio::test]
    async fn test_registry_exports_type_erased() {
        let mut registry = ExporterRegistry::new();
        registry.register(ProbeExporter);
        assert!(registry.contains("probe"));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["probe"]);

        let exporter = registry.get("probe").unwrap();
        let native = exporter
            .export_native(&UniMessage::from("x"), false)
            .await
            .unwrap();
        assert_eq!(
            native.downcast_ref::<Message<Probe>>(),
            Some(&Message::from(Probe::text("x")))
        );
    }
}

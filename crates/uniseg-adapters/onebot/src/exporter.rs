//! Canonical → OneBot v11 export.
//!
//! OneBot has no rich text, so styles are dropped and only the raw text is
//! sent. Resources become the `file` parameter understood by OneBot
//! implementations:
//!
//! | Source | `file` value |
//! |--------|--------------|
//! | id / URL | as is |
//! | local path | `file:///abs/path` |
//! | raw bytes | `base64://...` |

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use uniseg_core::{
    At, AtAll, AtFlag, Emoji, ExportResult, ForwardNode, Hyper, HyperFormat, MediaFields,
    MessageContent, MessageExporter, MessageSegment, Reference, ReferenceContent, Reply,
    ResourceSource, Segment as Uni, SegmentKind, SerializeFailed, Text,
};

use crate::ADAPTER_NAME;
use crate::model::{OneBotMessage, Segment};

const HANDLED: &[SegmentKind] = &[
    SegmentKind::Text,
    SegmentKind::At,
    SegmentKind::AtAll,
    SegmentKind::Emoji,
    SegmentKind::Image,
    SegmentKind::Audio,
    SegmentKind::Voice,
    SegmentKind::Video,
    SegmentKind::Reply,
    SegmentKind::Reference,
    SegmentKind::Hyper,
];

/// Exports canonical segments to OneBot v11 segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneBotMessageExporter;

#[async_trait]
impl MessageExporter for OneBotMessageExporter {
    type Segment = Segment;

    fn adapter(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn handles(&self) -> &'static [SegmentKind] {
        HANDLED
    }

    async fn text(&self, seg: &Text) -> ExportResult<Vec<Segment>> {
        Ok(vec![Segment::text(seg.text.clone())])
    }

    async fn at(&self, seg: &At) -> ExportResult<Vec<Segment>> {
        match seg.flag {
            AtFlag::User => Ok(vec![Segment::at(seg.target.clone())]),
            AtFlag::Role | AtFlag::Channel => Err(SerializeFailed::new(ADAPTER_NAME, seg.clone())),
        }
    }

    async fn at_all(&self, _seg: &AtAll) -> ExportResult<Vec<Segment>> {
        Ok(vec![Segment::at_all()])
    }

    async fn emoji(&self, seg: &Emoji) -> ExportResult<Vec<Segment>> {
        Ok(vec![Segment::face(seg.id.clone())])
    }

    async fn media(&self, seg: &Uni, media: &MediaFields) -> ExportResult<Vec<Segment>> {
        let Some(file) = file_param(media) else {
            return Err(SerializeFailed::new(ADAPTER_NAME, seg.clone()));
        };
        let native = match seg.kind() {
            SegmentKind::Image => Segment::image(file),
            SegmentKind::Voice | SegmentKind::Audio => Segment::record(file),
            SegmentKind::Video => Segment::video(file),
            _ => return Err(SerializeFailed::new(ADAPTER_NAME, seg.clone())),
        };
        Ok(vec![native])
    }

    async fn reply(&self, seg: &Reply) -> ExportResult<Vec<Segment>> {
        Ok(vec![Segment::reply(seg.id.clone())])
    }

    async fn reference(&self, seg: &Reference) -> ExportResult<Vec<Segment>> {
        match (&seg.content, &seg.id) {
            (Some(ReferenceContent::Nodes(nodes)), _) => {
                let mut exported = Vec::with_capacity(nodes.len());
                for node in nodes {
                    exported.push(self.forward_node(seg, node).await?);
                }
                Ok(exported)
            }
            (Some(ReferenceContent::Native(native)), _) => {
                match native.downcast_ref::<OneBotMessage>() {
                    Some(message) => Ok(message.iter().cloned().collect()),
                    None => Err(SerializeFailed::new(ADAPTER_NAME, seg.clone())),
                }
            }
            (Some(ReferenceContent::Text(_)), _) | (None, None) => {
                Err(SerializeFailed::new(ADAPTER_NAME, seg.clone()))
            }
            (None, Some(id)) => Ok(vec![Segment::forward(id.clone())]),
        }
    }

    async fn hyper(&self, seg: &Hyper) -> ExportResult<Vec<Segment>> {
        let Some(raw) = seg.raw.clone() else {
            return Err(SerializeFailed::new(ADAPTER_NAME, seg.clone()));
        };
        Ok(vec![match seg.format {
            HyperFormat::Xml => Segment::xml(raw),
            HyperFormat::Json => Segment::json(raw),
        }])
    }
}

impl OneBotMessageExporter {
    /// Exports one node of `owner`, failing with `owner` when the node
    /// carries another platform's native content.
    async fn forward_node(&self, owner: &Reference, node: &ForwardNode) -> ExportResult<Segment> {
        let node = match node {
            ForwardNode::Ref(node) => Segment::node(node.id.clone()),
            ForwardNode::Custom(node) => {
                let content = match &node.content {
                    MessageContent::Text(text) => vec![Segment::text(text.clone())],
                    MessageContent::Segments(message) => {
                        self.export(message, true).await?.into_segments()
                    }
                    MessageContent::Native(native) => match native.downcast_ref::<OneBotMessage>()
                    {
                        Some(message) => message.iter().cloned().collect(),
                        None => {
                            debug!(uid = %node.uid, "Node content is another platform's message");
                            return Err(SerializeFailed::new(ADAPTER_NAME, owner.clone()));
                        }
                    },
                };
                Segment::node_custom(node.uid.clone(), node.name.clone(), content)
            }
        };
        Ok(node)
    }
}

/// The `file` parameter for a resource, or `None` if nothing is attached.
fn file_param(media: &MediaFields) -> Option<String> {
    let file = match media.resolve()? {
        ResourceSource::Url(url) => url.to_owned(),
        ResourceSource::Path(path) => file_uri(path),
        ResourceSource::Raw { data, .. } => format!("base64://{}", STANDARD.encode(data)),
    };
    debug!(name = media.name(), "Resolved OneBot file parameter");
    Some(file)
}

fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CqCode;
    use std::any::Any;

    use serde_json::Value;
    use uniseg_core::{
        Audio, Custom, CustomNode, ErasedMessage, Image, NativeMessage, Origin, Other, RefNode,
        UniMessage, Video, Voice,
    };

    /// A message of some other platform.
    #[derive(Debug)]
    struct ForeignMessage(&'static str);

    impl ErasedMessage for ForeignMessage {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn extract_plain_text(&self) -> String {
            self.0.to_owned()
        }

        fn to_value(&self) -> Value {
            Value::String(self.0.to_owned())
        }
    }

    #[tokio::test]
    async fn test_styled_text_is_sent_plain() {
        let text = Text::new("hello world").marked(0, 5, ["b"]);
        let message = UniMessage::from(text) + At::user("10001") + AtAll::new(false);
        let native = OneBotMessageExporter.export(&message, false).await.unwrap();
        assert_eq!(
            native.into_segments(),
            vec![
                Segment::text("hello world"),
                Segment::at("10001"),
                Segment::at_all()
            ]
        );
    }

    #[tokio::test]
    async fn test_role_mention_fails() {
        let err = OneBotMessageExporter
            .export(&[Uni::from(At::role("admins"))], true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SegmentKind::At);
        assert_eq!(err.adapter, "onebot");
    }

    #[tokio::test]
    async fn test_media_sources() {
        let message = UniMessage::new()
            .with(Image::from_url("https://example.com/a.png"))
            .with(Voice::from_raw(&b"#!AMR\n"[..]).with_duration(3))
            .with(Audio::from_id("music.mp3"))
            .with(Video::from_path("/tmp/v.mp4"));
        let native = OneBotMessageExporter.export(&message, false).await.unwrap();
        let native = native.into_segments();
        assert_eq!(native[0], Segment::image("https://example.com/a.png"));
        assert_eq!(native[1], Segment::record("base64://IyFBTVIK"));
        assert_eq!(native[2], Segment::record("music.mp3"));
        assert_eq!(native[3], Segment::video("file:///tmp/v.mp4"));
    }

    #[tokio::test]
    async fn test_media_without_source_fails() {
        let err = OneBotMessageExporter
            .export(&[Uni::from(Image::new(MediaFields::new("image.png")))], true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SegmentKind::Image);
    }

    #[tokio::test]
    async fn test_file_falls_back_to_text() {
        let file = uniseg_core::File::from_id("doc-1");
        let err = OneBotMessageExporter
            .export(&[Uni::from(file.clone())], false)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SegmentKind::File);

        let native = OneBotMessageExporter
            .export(&[Uni::from(file)], true)
            .await
            .unwrap();
        assert_eq!(native.to_cq_string(), "&#91;file&#93;");
    }

    #[tokio::test]
    async fn test_forward_nodes() {
        let inner = UniMessage::from("look ") + Image::from_id("a.image");
        let reference = Reference::forward([
            ForwardNode::from(RefNode::new("42")),
            ForwardNode::from(CustomNode::new("10001", "Alice", inner)),
            ForwardNode::from(CustomNode::new("10002", "Bob", "plain")),
        ]);
        let native = OneBotMessageExporter
            .export(&[Uni::from(reference)], false)
            .await
            .unwrap();
        assert_eq!(
            native.into_segments(),
            vec![
                Segment::node("42"),
                Segment::node_custom(
                    "10001",
                    "Alice",
                    vec![Segment::text("look "), Segment::image("a.image")]
                ),
                Segment::node_custom("10002", "Bob", vec![Segment::text("plain")]),
            ]
        );
    }

    #[tokio::test]
    async fn test_reference_by_id_and_text() {
        let native = OneBotMessageExporter
            .export(&[Uni::from(Reference::from_id("fw-1"))], false)
            .await
            .unwrap();
        assert_eq!(native.into_segments(), vec![Segment::forward("fw-1")]);

        let text = Reference::default().with_content(ReferenceContent::Text("hi".into()));
        assert!(
            OneBotMessageExporter
                .export(&[Uni::from(text)], false)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_hyper_and_reply() {
        let message = UniMessage::new()
            .with(Reply::new("7"))
            .with(Hyper::json(r#"{"app":"x"}"#))
            .with(Hyper::xml("<msg/>"));
        let native = OneBotMessageExporter.export(&message, false).await.unwrap();
        assert_eq!(
            native.into_segments(),
            vec![
                Segment::reply("7"),
                Segment::json(r#"{"app":"x"}"#),
                Segment::xml("<msg/>")
            ]
        );
    }

    #[tokio::test]
    async fn test_custom_and_other_pass_through() {
        let music = Custom::new("music", serde_json::json!({"id": "1"}))
            .export_to("onebot", |_: &Custom| Some(Segment::json(r#"{"music":1}"#)));
        let poke = Uni::Other(Other::new(Origin::new(Segment::poke("1", "2"))));

        let message = UniMessage::new().with(music).with(poke);
        let native = OneBotMessageExporter.export(&message, false).await.unwrap();
        assert_eq!(
            native.into_segments(),
            vec![Segment::json(r#"{"music":1}"#), Segment::poke("1", "2")]
        );
    }

    #[tokio::test]
    async fn test_foreign_node_content_fails_with_reference() {
        let node = CustomNode::new(
            "10001",
            "Alice",
            MessageContent::Native(NativeMessage::new(ForeignMessage("elsewhere"))),
        );
        let reference = Reference::forward([ForwardNode::from(node)]);
        let err = OneBotMessageExporter
            .export(&[Uni::from(reference)], true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SegmentKind::Reference);
        assert_eq!(err.adapter, "onebot");
    }
}

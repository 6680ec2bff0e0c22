//! Canonical → Satori export.
//!
//! Text is exported run by run: each styled run is wrapped in the elements
//! its style names resolve to through the exporter's [`StyleRegistry`], and
//! adjacent runs sharing an outer tag other than `<p>` are folded back into
//! one element.
//! A run styled `br`, or consisting of a single newline, becomes `<br/>`.
//!
//! Resources are referenced by URL, by `file://` URL for local paths, or
//! inline as a `data:` URL.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use uniseg_core::{
    At, AtAll, AtFlag, ExportResult, ForwardNode, MediaFields, MessageContent, MessageExporter,
    MessageSegment, Reference, ReferenceContent, Reply, ResourceSource, Segment as Uni,
    SegmentKind, SerializeFailed, Text,
};

use crate::ADAPTER_NAME;
use crate::model::{Element, ResourceData, SatoriMessage, StyleTag};
use crate::style::StyleRegistry;

const HANDLED: &[SegmentKind] = &[
    SegmentKind::Text,
    SegmentKind::At,
    SegmentKind::AtAll,
    SegmentKind::Image,
    SegmentKind::Audio,
    SegmentKind::Voice,
    SegmentKind::Video,
    SegmentKind::File,
    SegmentKind::Reply,
    SegmentKind::Reference,
];

/// Exports canonical segments to Satori elements.
#[derive(Debug, Clone, Default)]
pub struct SatoriMessageExporter {
    styles: StyleRegistry,
}

impl SatoriMessageExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `styles` to resolve text style names.
    pub fn with_styles(styles: StyleRegistry) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Exports content nested in a reply or a forward node of `owner`.
    ///
    /// Another platform's native content fails with `owner`.
    async fn content<S>(&self, owner: &S, content: &MessageContent) -> ExportResult<Vec<Element>>
    where
        S: Clone + Into<Uni> + Sync,
    {
        Ok(match content {
            MessageContent::Text(text) => vec![Element::text(text.clone())],
            MessageContent::Segments(message) => self.export(message, true).await?.into_segments(),
            MessageContent::Native(native) => match native.downcast_ref::<SatoriMessage>() {
                Some(message) => message.iter().cloned().collect(),
                None => {
                    debug!("Nested content is another platform's message");
                    return Err(SerializeFailed::new(ADAPTER_NAME, owner.clone()));
                }
            },
        })
    }
}

#[async_trait]
impl MessageExporter for SatoriMessageExporter {
    type Segment = Element;

    fn adapter(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn handles(&self) -> &'static [SegmentKind] {
        HANDLED
    }

    async fn text(&self, seg: &Text) -> ExportResult<Vec<Element>> {
        let mut elements = Vec::new();
        for run in seg.runs() {
            if run.styles.is_empty() {
                elements.push(Element::text(run.text));
                continue;
            }
            if run.text == "\n" || run.styles.iter().any(|style| style == "br") {
                elements.push(Element::br());
                continue;
            }
            let mut element = Element::text(run.text);
            for style in run.styles.iter().rev() {
                element = self
                    .styles
                    .apply(style, vec![element])
                    .ok_or_else(|| SerializeFailed::style(ADAPTER_NAME, style.clone(), seg.clone()))?;
            }
            push_merged(&mut elements, element);
        }
        Ok(elements)
    }

    async fn at(&self, seg: &At) -> ExportResult<Vec<Element>> {
        let name = seg.display.clone();
        Ok(vec![match seg.flag {
            AtFlag::User => Element::at(seg.target.clone(), name),
            AtFlag::Role => Element::at_role(seg.target.clone(), name),
            AtFlag::Channel => Element::sharp(seg.target.clone(), name),
        }])
    }

    async fn at_all(&self, seg: &AtAll) -> ExportResult<Vec<Element>> {
        Ok(vec![Element::at_all(seg.here)])
    }

    async fn media(&self, seg: &Uni, media: &MediaFields) -> ExportResult<Vec<Element>> {
        let Some(src) = resource_src(media) else {
            return Err(SerializeFailed::new(ADAPTER_NAME, seg.clone()));
        };
        let mut data = ResourceData::new(src);
        let element = match seg.kind() {
            SegmentKind::Image => Element::Image(data),
            SegmentKind::Voice | SegmentKind::Audio => Element::Audio(data),
            SegmentKind::Video => Element::Video(data),
            SegmentKind::File => {
                data.title = Some(media.name().to_owned());
                Element::File(data)
            }
            _ => return Err(SerializeFailed::new(ADAPTER_NAME, seg.clone())),
        };
        Ok(vec![element])
    }

    async fn reply(&self, seg: &Reply) -> ExportResult<Vec<Element>> {
        let children = match &seg.msg {
            Some(content) => self.content(seg, content).await?,
            None => Vec::new(),
        };
        Ok(vec![Element::quote(seg.id.clone(), children)])
    }

    async fn reference(&self, seg: &Reference) -> ExportResult<Vec<Element>> {
        let children = match &seg.content {
            None => Vec::new(),
            Some(ReferenceContent::Text(text)) => vec![Element::text(text.clone())],
            Some(ReferenceContent::Nodes(nodes)) => {
                let mut children = Vec::with_capacity(nodes.len());
                for node in nodes {
                    children.push(match node {
                        ForwardNode::Ref(node) => {
                            Element::message(Some(node.id.clone()), false, Vec::new())
                        }
                        ForwardNode::Custom(node) => {
                            let mut content =
                                vec![Element::author(node.uid.clone(), node.name.clone())];
                            content.extend(self.content(seg, &node.content).await?);
                            Element::message(None, false, content)
                        }
                    });
                }
                children
            }
            Some(ReferenceContent::Native(native)) => match native.downcast_ref::<SatoriMessage>() {
                Some(message) => message.iter().cloned().collect(),
                None => return Err(SerializeFailed::new(ADAPTER_NAME, seg.clone())),
            },
        };
        Ok(vec![Element::message(
            seg.id.clone(),
            seg.is_forward(),
            children,
        )])
    }
}

/// Appends `element`, folding it into the previous element when both are
/// the same style tag. Paragraphs stay separate.
fn push_merged(elements: &mut Vec<Element>, element: Element) {
    match element {
        Element::Style(next) => match elements.last_mut() {
            Some(Element::Style(last))
                if last.tag == next.tag && last.tag != StyleTag::Paragraph =>
            {
                for child in next.children {
                    push_merged(&mut last.children, child);
                }
            }
            _ => elements.push(Element::Style(next)),
        },
        element => elements.push(element),
    }
}

fn resource_src(media: &MediaFields) -> Option<String> {
    Some(match media.resolve()? {
        ResourceSource::Url(url) => url.to_owned(),
        ResourceSource::Path(path) => file_url(path),
        ResourceSource::Raw { data, mimetype } => {
            format!("data:{mimetype};base64,{}", STANDARD.encode(data))
        }
    })
}

fn file_url(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    use serde_json::Value;
    use uniseg_core::{
        Audio, CustomNode, ErasedMessage, File, Hyper, Image, NativeMessage, RefNode, UniMessage,
        Voice,
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

    async fn markup(message: impl Into<UniMessage>) -> String {
        let message = message.into();
        SatoriMessageExporter::new()
            .export(&message, false)
            .await
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_styled_runs_fold_into_nested_elements() {
        let text = Text::new("hello world")
            .marked(0, 5, ["b"])
            .marked(3, 8, ["i"]);
        assert_eq!(
            markup(text).await,
            "<b>hel<i>lo</i></b><i> wo</i>rld"
        );

        let aliases = Text::new("x").marked(0, 1, ["strong", "spoiler"]);
        let elements = SatoriMessageExporter::new().text(&aliases).await.unwrap();
        assert_eq!(
            elements,
            vec![Element::style(
                StyleTag::Bold,
                vec![Element::style(StyleTag::Spoiler, vec![Element::text("x")])]
            )]
        );
    }

    #[tokio::test]
    async fn test_line_breaks() {
        let text = Text::new("a\nb").marked(1, 2, ["b"]);
        assert_eq!(markup(text).await, "a<br/>b");
        assert_eq!(markup(Text::new("x").marked(0, 1, ["br"])).await, "<br/>");
    }

    #[tokio::test]
    async fn test_unknown_style_fails_with_style() {
        let err = SatoriMessageExporter::new()
            .export(&[Uni::from(Text::new("x").marked(0, 1, ["blink"]))], true)
            .await
            .unwrap_err();
        assert_eq!(err.style.as_deref(), Some("blink"));
        assert_eq!(err.kind, SegmentKind::Text);
    }

    #[tokio::test]
    async fn test_registered_style_handler() {
        let mut styles = StyleRegistry::default();
        styles.register("shout", |children| {
            let text = children.iter().map(ToString::to_string).collect::<String>();
            Element::text(text.to_uppercase())
        });
        let exporter = SatoriMessageExporter::with_styles(styles);
        let message = UniMessage::from(Text::new("hey").marked(0, 3, ["shout"]));
        let native = exporter.export(&message, false).await.unwrap();
        assert_eq!(native.to_string(), "HEY");
    }

    #[tokio::test]
    async fn test_link_style_by_default() {
        let message = UniMessage::from(Text::new("see https://a.b").marked(4, 15, ["link"]));
        assert_eq!(markup(message).await, r#"see <a href="https://a.b"/>"#);
    }

    #[tokio::test]
    async fn test_mentions() {
        let message = UniMessage::from(At::user("1").with_display("Alice"))
            + At::role("mods")
            + At::channel("general")
            + AtAll::new(false);
        assert_eq!(
            markup(message).await,
            r#"<at id="1" name="Alice"/><at role="mods"/><sharp id="general"/><at type="all"/>"#
        );
    }

    #[tokio::test]
    async fn test_resources() {
        let message = UniMessage::new()
            .with(Image::from_id("https://example.com/a.png"))
            .with(Voice::from_raw(&b"#!AMR\n"[..]))
            .with(Audio::from_path("/srv/music.mp3"))
            .with(File::new(
                MediaFields::new("report.pdf").with_url("https://example.com/r.pdf"),
            ));
        assert_eq!(
            markup(message).await,
            concat!(
                r#"<img src="https://example.com/a.png"/>"#,
                r#"<audio src="data:audio/amr;base64,IyFBTVIK"/>"#,
                r#"<audio src="file:///srv/music.mp3"/>"#,
                r#"<file src="https://example.com/r.pdf" title="report.pdf"/>"#,
            )
        );
    }

    #[tokio::test]
    async fn test_reply_with_nested_message() {
        let reply = Reply::new("m1").with_msg(UniMessage::from("quoted ") + At::user("2"));
        assert_eq!(
            markup(reply).await,
            r#"<quote id="m1">quoted <at id="2"/></quote>"#
        );
    }

    #[tokio::test]
    async fn test_forward_reference() {
        let reference = Reference::forward([
            ForwardNode::from(RefNode::new("42")),
            ForwardNode::from(CustomNode::new("10001", "Alice", "hi")),
        ]);
        assert_eq!(
            markup(reference).await,
            concat!(
                r#"<message forward><message id="42"/>"#,
                r#"<message><author id="10001" name="Alice"/>hi</message></message>"#,
            )
        );
        assert_eq!(
            markup(Reference::from_id("fw")).await,
            r#"<message id="fw"/>"#
        );
    }

    #[tokio::test]
    async fn test_unhandled_kind_falls_back_to_text() {
        let message = UniMessage::from(Hyper::xml("<msg/>"));
        let exporter = SatoriMessageExporter::new();
        assert!(exporter.export(&message, false).await.is_err());
        let native = exporter.export(&message, true).await.unwrap();
        assert_eq!(native.extract_plain_text(), "[hyper]");
    }

    #[tokio::test]
    async fn test_paragraphs_stay_separate() {
        let text = Text::new("abcd")
            .marked(0, 2, ["p"])
            .marked(2, 4, ["p", "b"]);
        assert_eq!(text.render(), "<p>ab</p><p><b>cd</b></p>");
        assert_eq!(markup(text).await, "<p>ab</p><p><b>cd</b></p>");
    }

    #[tokio::test]
    async fn test_foreign_native_content_fails() {
        let foreign = NativeMessage::new(ForeignMessage("elsewhere"));
        let exporter = SatoriMessageExporter::new();

        let reply = Reply::new("1").with_msg(foreign.clone());
        let err = exporter
            .export(&[Uni::from(reply)], true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SegmentKind::Reply);

        let node = CustomNode::new("10001", "Alice", foreign);
        let reference = Reference::forward([ForwardNode::from(node)]);
        let err = exporter
            .export(&[Uni::from(reference)], true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SegmentKind::Reference);
    }
}

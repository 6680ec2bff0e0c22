//! Satori → canonical conversion.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use uniseg_core::{
    At, AtAll, Audio, File, Image, MediaFields, MessageBuilder, NativeMessage, Reference,
    ReferenceContent, Reply, Segment as Uni, Text, Video,
};

use crate::ADAPTER_NAME;
use crate::model::{AtData, Element, ResourceData, SatoriMessage};

/// Builds canonical segments from Satori elements.
///
/// Style elements become [`Text`] marked with their tag names, nested
/// styles included. Quotes and messages keep their children as a native
/// [`SatoriMessage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SatoriMessageBuilder;

impl MessageBuilder for SatoriMessageBuilder {
    type Segment = Element;

    fn adapter(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn build(&self, native: &Element) -> Option<Uni> {
        let seg = match native {
            Element::Text(data) => Text::new(data.text.clone()).into(),
            Element::Br => Text::new("\n").into(),
            Element::Style(_) => styled_text(native)?.into(),
            Element::At(data) => mention(data)?,
            Element::Sharp(data) => {
                let at = At::channel(data.id.clone());
                match &data.name {
                    Some(name) => at.with_display(name.clone()).into(),
                    None => at.into(),
                }
            }
            Element::Image(data) => Image::new(resource(Image::DEFAULT_NAME, data)?).into(),
            Element::Audio(data) => Audio::new(resource(Audio::DEFAULT_NAME, data)?).into(),
            Element::Video(data) => Video::new(resource(Video::DEFAULT_NAME, data)?).into(),
            Element::File(data) => File::new(resource(File::DEFAULT_NAME, data)?).into(),
            Element::Quote(data) => {
                let reply = Reply::new(data.id.clone()?);
                if data.children.is_empty() {
                    reply.into()
                } else {
                    reply.with_msg(native_children(&data.children)).into()
                }
            }
            Element::Message(data) => {
                let mut reference = Reference::default();
                if let Some(id) = &data.id {
                    reference = reference.with_id(id.clone());
                }
                if !data.children.is_empty() {
                    reference = reference
                        .with_content(ReferenceContent::Native(native_children(&data.children)));
                }
                reference.into()
            }
            Element::Link(_) | Element::Author(_) => return None,
        };
        Some(seg)
    }
}

fn mention(data: &AtData) -> Option<Uni> {
    match data.at_type.as_deref() {
        Some("all") => return Some(AtAll::new(false).into()),
        Some("here") => return Some(AtAll::new(true).into()),
        _ => {}
    }
    let at = match (&data.role, &data.id) {
        (Some(role), _) => At::role(role.clone()),
        (None, Some(id)) => At::user(id.clone()),
        (None, None) => return None,
    };
    Some(match &data.name {
        Some(name) => at.with_display(name.clone()).into(),
        None => at.into(),
    })
}

fn native_children(children: &[Element]) -> NativeMessage {
    NativeMessage::from(SatoriMessage::from_segments(children.to_vec()))
}

// ============================================================================
// Styled Text
// ============================================================================

/// Flattens a style element into marked text.
///
/// Outer tags are marked before inner ones so they nest outside. Anything
/// but text, line breaks and styles inside makes the element unbuildable.
fn styled_text(element: &Element) -> Option<Text> {
    let mut text = String::new();
    let mut spans = Vec::new();
    flatten(element, &mut text, &mut spans)?;
    Some(Text::with_styles(text, spans))
}

fn flatten(
    element: &Element,
    text: &mut String,
    spans: &mut Vec<((usize, usize), Vec<String>)>,
) -> Option<()> {
    match element {
        Element::Text(data) => text.push_str(&data.text),
        Element::Br => text.push('\n'),
        Element::Style(data) => {
            let start = text.chars().count();
            let slot = spans.len();
            spans.push(((start, start), vec![data.tag.as_str().to_owned()]));
            for child in &data.children {
                flatten(child, text, spans)?;
            }
            spans[slot].0.1 = text.chars().count();
        }
        _ => return None,
    }
    Some(())
}

// ============================================================================
// Resources
// ============================================================================

/// Decodes a resource `src` into media fields.
///
/// `data:` URLs become raw bytes with their mime type, `file://` URLs a
/// local path, and anything else a URL. `None` for malformed `data:` URLs.
fn resource(default_name: &str, data: &ResourceData) -> Option<MediaFields> {
    let fields = MediaFields::new(data.title.as_deref().unwrap_or(default_name));
    if let Some(rest) = data.src.strip_prefix("data:") {
        let (meta, payload) = rest.split_once(',')?;
        let Some(mime) = meta.strip_suffix(";base64") else {
            debug!(src = %data.src, "Unsupported data URL encoding");
            return None;
        };
        let raw = match STANDARD.decode(payload) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(error = %err, "Malformed base64 payload in data URL");
                return None;
            }
        };
        let fields = fields.with_raw(raw);
        return Some(if mime.is_empty() {
            fields
        } else {
            fields.with_mimetype(mime)
        });
    }
    if let Some(path) = data.src.strip_prefix("file://") {
        return Some(fields.with_path(path));
    }
    Some(fields.with_url(data.src.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uniseg_core::MessageSegment as _;
    use uniseg_core::{MessageContent, SegmentKind};

    #[test]
    fn test_nested_styles_become_marks() {
        let element = Element::style(
            crate::model::StyleTag::Bold,
            vec![
                Element::text("bold "),
                Element::style(crate::model::StyleTag::Italic, vec![Element::text("both")]),
            ],
        );
        let seg = SatoriMessageBuilder.convert(&element);
        let text = seg.as_text().unwrap();
        assert_eq!(text.text, "bold both");
        assert_eq!(text.render(), "<b>bold <i>both</i></b>");
        assert!(seg.origin().is_some());
    }

    #[test]
    fn test_mentions() {
        let all = SatoriMessageBuilder.convert(&Element::at_all(true));
        assert_eq!(all, AtAll::new(true).into());

        let role = SatoriMessageBuilder.convert(&Element::at_role("admins", Some("Admins".into())));
        assert_eq!(role, At::role("admins").with_display("Admins").into());

        let channel = SatoriMessageBuilder.convert(&Element::sharp("general", None));
        assert_eq!(channel, At::channel("general").into());
    }

    #[test]
    fn test_resource_sources_are_decoded() {
        let raw = SatoriMessageBuilder.convert(&Element::image("data:image/png;base64,iVBORw=="));
        let media = raw.media().unwrap();
        assert_eq!(media.raw().map(|raw| raw.as_ref()), Some(&[0x89, b'P', b'N', b'G'][..]));
        assert_eq!(media.mimetype(), Some("image/png"));

        let path = SatoriMessageBuilder.convert(&Element::file("file:///tmp/report.pdf"));
        assert_eq!(path.kind(), SegmentKind::File);
        assert_eq!(
            path.media().unwrap().path(),
            Some(std::path::Path::new("/tmp/report.pdf"))
        );

        let url = SatoriMessageBuilder.convert(&Element::audio("https://example.com/a.mp3"));
        assert_eq!(url.media().unwrap().url(), Some("https://example.com/a.mp3"));

        let broken = SatoriMessageBuilder.convert(&Element::image("data:image/png;base64,!!"));
        assert_eq!(broken.kind(), SegmentKind::Other);
    }

    #[test]
    fn test_quote_keeps_native_children() {
        let quote = Element::quote("m1", vec![Element::text("quoted")]);
        match SatoriMessageBuilder.convert(&quote) {
            Uni::Reply(reply) => {
                assert_eq!(reply.id, "m1");
                match reply.msg {
                    Some(MessageContent::Native(native)) => {
                        assert_eq!(native.extract_plain_text(), "quoted")
                    }
                    other => panic!("unexpected content: {other:?}"),
                }
            }
            other => panic!("unexpected segment: {other:?}"),
        }
    }

    #[test]
    fn test_forward_message_and_unmapped_elements() {
        let forward = Element::message(None, true, vec![Element::message(Some("1".into()), false, vec![])]);
        match SatoriMessageBuilder.convert(&forward) {
            Uni::Reference(reference) => assert!(reference.is_forward()),
            other => panic!("unexpected segment: {other:?}"),
        }

        let author = SatoriMessageBuilder.convert(&Element::author("1", "Alice"));
        assert_eq!(author.kind(), SegmentKind::Other);
        assert_eq!(author.to_string(), "[author]");
    }
}

//! OneBot v11 → canonical conversion.

use uniseg_core::{
    At, AtAll, Emoji, Hyper, Image, MediaFields, MessageBuilder, Reference, Reply, Segment as Uni,
    Text, Video, Voice,
};

use crate::ADAPTER_NAME;
use crate::model::Segment;

/// Builds canonical segments from OneBot segments.
///
/// Media file names are kept as platform ids. Pokes and forward nodes have
/// no canonical counterpart and end up as `Other`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneBotMessageBuilder;

impl MessageBuilder for OneBotMessageBuilder {
    type Segment = Segment;

    fn adapter(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn build(&self, native: &Segment) -> Option<Uni> {
        let seg = match native {
            Segment::Text(data) => Text::new(data.text.clone()).into(),
            Segment::Face(data) => Emoji::new(data.id.clone()).into(),
            Segment::Image(data) => {
                Image::new(media(Image::DEFAULT_NAME, &data.file, data.url.as_deref())).into()
            }
            Segment::Record(data) => {
                Voice::new(media(Voice::DEFAULT_NAME, &data.file, data.url.as_deref())).into()
            }
            Segment::Video(data) => {
                Video::new(media(Video::DEFAULT_NAME, &data.file, data.url.as_deref())).into()
            }
            Segment::At(data) if data.qq == "all" => AtAll::new(false).into(),
            Segment::At(data) => At::user(data.qq.clone()).into(),
            Segment::Reply(data) => Reply::new(data.id.clone()).into(),
            Segment::Forward(data) => Reference::from_id(data.id.clone()).into(),
            Segment::Xml(data) => Hyper::xml(data.data.clone()).into(),
            Segment::Json(data) => Hyper::json(data.data.clone()).into(),
            Segment::Poke(_) | Segment::Node(_) => return None,
        };
        Some(seg)
    }
}

fn media(name: &str, file: &str, url: Option<&str>) -> MediaFields {
    let fields = MediaFields::new(name).with_id(file);
    match url {
        Some(url) => fields.with_url(url),
        None => fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OneBotMessage, parse_cq_string};
    use serde_json::json;
    use uniseg_core::{PatternRegistry, SegmentKind};

    #[test]
    fn test_generate_from_cq_string() {
        let message = OneBotMessage::from_segments(parse_cq_string(
            "[CQ:reply,id=9]hi [CQ:at,qq=all][CQ:at,qq=10001][CQ:face,id=178]",
        ));
        let uni = OneBotMessageBuilder.generate(&message);
        let kinds: Vec<_> = uni.iter().map(Uni::kind).collect();
        assert_eq!(
            kinds,
            [
                SegmentKind::Reply,
                SegmentKind::Text,
                SegmentKind::AtAll,
                SegmentKind::At,
                SegmentKind::Emoji,
            ]
        );
        assert_eq!(uni.extract_plain_text(), "hi ");
        assert!(uni.iter().all(|seg| seg.origin().is_some()));
    }

    #[test]
    fn test_media_keeps_file_as_id() {
        let native: Segment = serde_json::from_value(json!({
            "type": "image",
            "data": {"file": "abc.image", "url": "https://gchat.qpic.cn/abc"}
        }))
        .unwrap();
        let seg = OneBotMessageBuilder.convert(&native);
        let media = seg.media().unwrap();
        assert_eq!(media.id(), Some("abc.image"));
        assert_eq!(media.url(), Some("https://gchat.qpic.cn/abc"));

        let voice = OneBotMessageBuilder.convert(&Segment::record("v.amr"));
        assert_eq!(voice.kind(), SegmentKind::Voice);
    }

    #[test]
    fn test_json_card_content_is_parsed() {
        let seg = OneBotMessageBuilder.convert(&Segment::json(r#"{"app":"demo"}"#));
        match seg {
            Uni::Hyper(hyper) => assert_eq!(hyper.content, Some(json!({"app": "demo"}))),
            other => panic!("unexpected segment: {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_segments_become_other() {
        let mut registry = PatternRegistry::new();
        registry.register_builder(OneBotMessageBuilder);

        let poke = Segment::poke("126", "2003");
        let seg = registry.recognize(&uniseg_core::Origin::new(poke.clone()));
        assert_eq!(seg.kind(), SegmentKind::Other);
        assert_eq!(seg.to_string(), "[poke]");
        assert_eq!(OneBotMessageBuilder.convert(&poke), seg);
    }
}

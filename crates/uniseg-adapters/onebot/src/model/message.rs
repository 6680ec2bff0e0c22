//! OneBot v11 message type.
//!
//! # Message Formats
//!
//! OneBot v11 supports two message formats:
//! - **Array format**: A JSON array of message segments (recommended)
//! - **String format**: CQ-coded string (legacy, for compatibility)
//!
//! [`OneBotMessage`] serializes as the array format;
//! [`parse_cq_string`] and [`CqCode`] convert from and to the string format.
//!
//! # Example
//!
//! ```rust,ignore
//! use uniseg_adapter_onebot::{CqCode, OneBotMessage, Segment};
//!
//! let msg = OneBotMessage::from_segments(parse_cq_string("Hi [CQ:face,id=178]"));
//! assert_eq!(msg.to_cq_string(), "Hi [CQ:face,id=178]");
//! ```

use uniseg_core::{Message, MessageSegment};

use super::segment::{
    AtData, FaceData, ForwardData, ImageData, JsonData, PokeData, RecordData, ReplyData, Segment,
    VideoData, XmlData, unescape_cq_text,
};

/// A OneBot v11 message composed of multiple segments.
pub type OneBotMessage = Message<Segment>;

/// CQ-code rendering of a whole message.
pub trait CqCode {
    /// Converts the message to CQ code string format.
    fn to_cq_string(&self) -> String;
}

impl CqCode for OneBotMessage {
    fn to_cq_string(&self) -> String {
        self.iter().map(Segment::to_cq_code).collect()
    }
}

// ============================================================================
// CQ Code Parsing
// ============================================================================

const CQ_OPEN: [char; 4] = ['[', 'C', 'Q', ':'];

/// Parses a CQ code string into a vector of segments.
///
/// This handles the string format where text and CQ codes are mixed:
/// ```text
/// Hello [CQ:face,id=178] World [CQ:at,qq=10001000]
/// ```
///
/// Unknown or malformed CQ codes are kept as literal text.
pub fn parse_cq_string(input: &str) -> Vec<Segment> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let opens_at = |pos: usize| chars.get(pos..pos + CQ_OPEN.len()) == Some(&CQ_OPEN[..]);

    let mut segments = Vec::new();
    let mut pos = 0;
    while pos < len {
        if opens_at(pos) {
            let start = pos;
            pos += CQ_OPEN.len();

            let func_start = pos;
            while pos < len && chars[pos] != ',' && chars[pos] != ']' {
                pos += 1;
            }
            let func: String = chars[func_start..pos].iter().collect();

            let mut params: Vec<(String, String)> = Vec::new();
            while pos < len && chars[pos] == ',' {
                pos += 1;
                let key_start = pos;
                while pos < len && chars[pos] != '=' && chars[pos] != ']' {
                    pos += 1;
                }
                let key: String = chars[key_start..pos].iter().collect();

                if pos < len && chars[pos] == '=' {
                    pos += 1;
                    let value_start = pos;
                    while pos < len && chars[pos] != ',' && chars[pos] != ']' {
                        pos += 1;
                    }
                    let value: String = chars[value_start..pos].iter().collect();
                    params.push((key, unescape_cq_text(&value)));
                }
            }

            if pos < len && chars[pos] == ']' {
                pos += 1;
            }

            match cq_to_segment(&func, &params) {
                Some(segment) => segments.push(segment),
                None => {
                    let literal: String = chars[start..pos].iter().collect();
                    segments.push(Segment::text(literal));
                }
            }
        } else {
            let start = pos;
            while pos < len && !opens_at(pos) {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().collect();
            let text = unescape_cq_text(&text);
            if !text.is_empty() {
                segments.push(Segment::text(text));
            }
        }
    }

    segments
}

/// Converts a parsed CQ code into a segment.
fn cq_to_segment(func: &str, params: &[(String, String)]) -> Option<Segment> {
    let get = |key: &str| -> Option<String> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let segment = match func {
        "face" => Segment::Face(FaceData { id: get("id")? }),
        "image" => Segment::Image(ImageData {
            file: get("file")?,
            image_type: get("type"),
            url: get("url"),
            cache: get("cache"),
        }),
        "record" => Segment::Record(RecordData {
            file: get("file")?,
            magic: get("magic"),
            url: get("url"),
            cache: get("cache"),
        }),
        "video" => Segment::Video(VideoData {
            file: get("file")?,
            url: get("url"),
            cache: get("cache"),
        }),
        "at" => Segment::At(AtData { qq: get("qq")? }),
        "poke" => Segment::Poke(PokeData {
            poke_type: get("type")?,
            id: get("id")?,
            name: get("name"),
        }),
        "reply" => Segment::Reply(ReplyData { id: get("id")? }),
        "forward" => Segment::Forward(ForwardData { id: get("id")? }),
        "xml" => Segment::Xml(XmlData { data: get("data")? }),
        "json" => Segment::Json(JsonData { data: get("data")? }),
        _ => return None,
    };
    Some(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_string() {
        let segments = parse_cq_string("Hello [CQ:face,id=178] World [CQ:at,qq=10001000]");
        assert_eq!(
            segments,
            vec![
                Segment::text("Hello "),
                Segment::face("178"),
                Segment::text(" World "),
                Segment::at("10001000"),
            ]
        );
    }

    #[test]
    fn test_parse_unescapes_values() {
        let segments = parse_cq_string("a&#91;1&#93; [CQ:json,data={\"a\":1&#44;\"b\":2}]");
        assert_eq!(segments[0], Segment::text("a[1] "));
        assert_eq!(segments[1], Segment::json(r#"{"a":1,"b":2}"#));
    }

    #[test]
    fn test_unknown_code_is_kept_as_text() {
        let segments = parse_cq_string("[CQ:shake]");
        assert_eq!(segments, vec![Segment::text("[CQ:shake]")]);
    }

    #[test]
    fn test_cq_string_roundtrip() {
        let source = "Hi [CQ:reply,id=5][CQ:image,file=a.png] &amp; bye";
        let msg = OneBotMessage::from_segments(parse_cq_string(source));
        assert_eq!(msg.len(), 4);
        assert_eq!(msg.to_cq_string(), source);
        assert_eq!(msg.extract_plain_text(), "Hi  & bye");
    }
}

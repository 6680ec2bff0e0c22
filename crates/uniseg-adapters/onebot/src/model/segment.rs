//! OneBot v11 message segment types.
//!
//! A message segment is a single unit of content in a OneBot message, such
//! as plain text, an image or a mention. Only the segments that take part in
//! canonical conversion are modelled; anything else a peer sends is kept by
//! the canonical layer as an opaque `Other`.
//!
//! # CQ Code Mapping
//!
//! Each segment type corresponds to a CQ code in the string format:
//! - `text` → plain text (no CQ code)
//! - `face` → `[CQ:face,id=123]`
//! - `image` → `[CQ:image,file=xxx]`
//! - etc.
//!
//! # Example
//!
//! ```rust,ignore
//! use uniseg_adapter_onebot::Segment;
//!
//! let text = Segment::text("Hello, ");
//! let at = Segment::at("10001000");
//! let face = Segment::face("178");
//! ```

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use uniseg_core::MessageSegment;

// ============================================================================
// Segment Enum
// ============================================================================

/// A OneBot v11 message segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text content.
    Text(TextData),
    /// QQ emoji/face.
    Face(FaceData),
    /// Image.
    Image(ImageData),
    /// Voice/Audio record.
    Record(RecordData),
    /// Video.
    Video(VideoData),
    /// @mention someone.
    At(AtData),
    /// Poke message.
    Poke(PokeData),
    /// Reply to a message.
    Reply(ReplyData),
    /// Forward message reference.
    Forward(ForwardData),
    /// Forward node (for constructing forward messages).
    Node(NodeData),
    /// XML card.
    Xml(XmlData),
    /// JSON card.
    Json(JsonData),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Text(data) => f.write_str(&data.text),
            Segment::Face(data) => write!(f, "[face:{}]", data.id),
            Segment::Image(data) => write!(f, "[image:{}]", data.file),
            Segment::Record(data) => write!(f, "[record:{}]", data.file),
            Segment::Video(data) => write!(f, "[video:{}]", data.file),
            Segment::At(data) if data.qq == "all" => f.write_str("@all"),
            Segment::At(data) => write!(f, "@{}", data.qq),
            Segment::Poke(data) => write!(f, "[poke:{}]", data.poke_type),
            Segment::Reply(data) => write!(f, "[reply:{}]", data.id),
            Segment::Forward(data) => write!(f, "[forward:{}]", data.id),
            Segment::Node(_) => f.write_str("[node]"),
            Segment::Xml(_) => f.write_str("[xml]"),
            Segment::Json(_) => f.write_str("[json]"),
        }
    }
}

impl MessageSegment for Segment {
    fn text(text: impl Into<String>) -> Self {
        Segment::Text(TextData { text: text.into() })
    }

    fn segment_type(&self) -> &str {
        match self {
            Segment::Text(_) => "text",
            Segment::Face(_) => "face",
            Segment::Image(_) => "image",
            Segment::Record(_) => "record",
            Segment::Video(_) => "video",
            Segment::At(_) => "at",
            Segment::Poke(_) => "poke",
            Segment::Reply(_) => "reply",
            Segment::Forward(_) => "forward",
            Segment::Node(_) => "node",
            Segment::Xml(_) => "xml",
            Segment::Json(_) => "json",
        }
    }

    fn data(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut segment)) => match segment.remove("data") {
                Some(Value::Object(data)) => data,
                _ => Map::new(),
            },
            _ => Map::new(),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text(data) => Some(&data.text),
            _ => None,
        }
    }
}

// ============================================================================
// Segment Builder Methods
// ============================================================================

impl Segment {
    /// Creates a QQ face/emoji segment.
    pub fn face(id: impl Into<String>) -> Self {
        Segment::Face(FaceData { id: id.into() })
    }

    /// Creates an image segment from a file id, URL, `file://` path or
    /// `base64://` payload.
    pub fn image(file: impl Into<String>) -> Self {
        Segment::Image(ImageData {
            file: file.into(),
            ..ImageData::default()
        })
    }

    /// Creates a flash image segment.
    pub fn flash_image(file: impl Into<String>) -> Self {
        Segment::Image(ImageData {
            file: file.into(),
            image_type: Some("flash".to_string()),
            ..ImageData::default()
        })
    }

    /// Creates a voice/record segment.
    pub fn record(file: impl Into<String>) -> Self {
        Segment::Record(RecordData {
            file: file.into(),
            ..RecordData::default()
        })
    }

    /// Creates a video segment.
    pub fn video(file: impl Into<String>) -> Self {
        Segment::Video(VideoData {
            file: file.into(),
            ..VideoData::default()
        })
    }

    /// Creates an @mention segment for a specific user.
    pub fn at(qq: impl Into<String>) -> Self {
        Segment::At(AtData { qq: qq.into() })
    }

    /// Creates an @all segment to mention everyone.
    pub fn at_all() -> Self {
        Segment::At(AtData {
            qq: "all".to_string(),
        })
    }

    /// Creates a poke segment.
    pub fn poke(poke_type: impl Into<String>, id: impl Into<String>) -> Self {
        Segment::Poke(PokeData {
            poke_type: poke_type.into(),
            id: id.into(),
            name: None,
        })
    }

    /// Creates a reply segment referencing another message.
    pub fn reply(id: impl Into<String>) -> Self {
        Segment::Reply(ReplyData { id: id.into() })
    }

    /// Creates a forward reference segment.
    pub fn forward(id: impl Into<String>) -> Self {
        Segment::Forward(ForwardData { id: id.into() })
    }

    /// Creates a forward node referencing an existing message.
    pub fn node(id: impl Into<String>) -> Self {
        Segment::Node(NodeData {
            id: Some(id.into()),
            ..NodeData::default()
        })
    }

    /// Creates a custom forward node.
    pub fn node_custom(
        user_id: impl Into<String>,
        nickname: impl Into<String>,
        content: Vec<Segment>,
    ) -> Self {
        Segment::Node(NodeData {
            id: None,
            user_id: Some(user_id.into()),
            nickname: Some(nickname.into()),
            content: Some(content),
        })
    }

    /// Creates an XML card segment.
    pub fn xml(data: impl Into<String>) -> Self {
        Segment::Xml(XmlData { data: data.into() })
    }

    /// Creates a JSON card segment.
    pub fn json(data: impl Into<String>) -> Self {
        Segment::Json(JsonData { data: data.into() })
    }
}

// ============================================================================
// Segment Data Types
// ============================================================================

/// Plain text segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

/// QQ face/emoji segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    /// The face ID. See QQ face ID table.
    pub id: String,
}

/// Image segment data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Image file name, path, URL, or base64.
    pub file: String,
    /// Image type: "flash" for flash image, None for normal.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    /// Image URL (receive only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Whether to use cached file (send only, default: 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
}

/// Voice/Record segment data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordData {
    /// Audio file name, path, URL, or base64.
    pub file: String,
    /// Voice change: "0" or "1".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic: Option<String>,
    /// Audio URL (receive only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
}

/// Video segment data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoData {
    /// Video file name, path, URL, or base64.
    pub file: String,
    /// Video URL (receive only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
}

/// @mention segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtData {
    /// QQ number or "all" for @everyone.
    pub qq: String,
}

/// Poke segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokeData {
    /// Poke type. See Mirai's PokeMessage.
    #[serde(rename = "type")]
    pub poke_type: String,
    pub id: String,
    /// Poke name (receive only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Reply segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyData {
    /// Message ID to reply to.
    pub id: String,
}

/// Forward reference segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardData {
    /// Forward message ID.
    pub id: String,
}

/// Forward node segment data.
///
/// Either `id` references an existing message, or `user_id`, `nickname` and
/// `content` describe a synthesized one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Segment>>,
}

/// XML card segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlData {
    pub data: String,
}

/// JSON card segment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonData {
    pub data: String,
}

// ============================================================================
// CQ Code Conversion
// ============================================================================

impl Segment {
    /// Converts this segment to a CQ code string.
    ///
    /// Text segments are returned as plain text (with escaping).
    /// Other segments are formatted as `[CQ:type,key=value,...]`.
    pub fn to_cq_code(&self) -> String {
        match self {
            Segment::Text(data) => escape_cq_text(&data.text),
            Segment::Face(data) => format!("[CQ:face,id={}]", data.id),
            Segment::Image(data) => {
                let mut cq = format!("[CQ:image,file={}", escape_cq_value(&data.file));
                push_param(&mut cq, "type", data.image_type.as_deref());
                push_param(&mut cq, "cache", data.cache.as_deref());
                cq.push(']');
                cq
            }
            Segment::Record(data) => {
                let mut cq = format!("[CQ:record,file={}", escape_cq_value(&data.file));
                push_param(&mut cq, "magic", data.magic.as_deref());
                push_param(&mut cq, "cache", data.cache.as_deref());
                cq.push(']');
                cq
            }
            Segment::Video(data) => {
                let mut cq = format!("[CQ:video,file={}", escape_cq_value(&data.file));
                push_param(&mut cq, "cache", data.cache.as_deref());
                cq.push(']');
                cq
            }
            Segment::At(data) => format!("[CQ:at,qq={}]", data.qq),
            Segment::Poke(data) => {
                format!("[CQ:poke,type={},id={}]", data.poke_type, data.id)
            }
            Segment::Reply(data) => format!("[CQ:reply,id={}]", data.id),
            Segment::Forward(data) => format!("[CQ:forward,id={}]", data.id),
            Segment::Node(data) => match &data.id {
                Some(id) => format!("[CQ:node,id={id}]"),
                None => {
                    let mut cq = "[CQ:node".to_string();
                    push_param(&mut cq, "user_id", data.user_id.as_deref());
                    push_param(&mut cq, "nickname", data.nickname.as_deref());
                    if let Some(content) = &data.content {
                        let inner: String = content.iter().map(Segment::to_cq_code).collect();
                        push_param(&mut cq, "content", Some(&inner));
                    }
                    cq.push(']');
                    cq
                }
            },
            Segment::Xml(data) => format!("[CQ:xml,data={}]", escape_cq_value(&data.data)),
            Segment::Json(data) => format!("[CQ:json,data={}]", escape_cq_value(&data.data)),
        }
    }
}

fn push_param(cq: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = write!(cq, ",{key}={}", escape_cq_value(value));
    }
}

// ============================================================================
// CQ Code Escaping Utilities
// ============================================================================

/// Escapes special characters in plain text for CQ code format.
///
/// Escapes: `&` → `&amp;`, `[` → `&#91;`, `]` → `&#93;`
pub fn escape_cq_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('[', "&#91;")
        .replace(']', "&#93;")
}

/// Unescapes CQ code special characters back to plain text.
pub fn unescape_cq_text(text: &str) -> String {
    text.replace("&#91;", "[")
        .replace("&#93;", "]")
        .replace("&#44;", ",")
        .replace("&amp;", "&")
}

/// Escapes special characters in CQ code parameter values.
///
/// Escapes: `&` → `&amp;`, `[` → `&#91;`, `]` → `&#93;`, `,` → `&#44;`
pub fn escape_cq_value(value: &str) -> String {
    escape_cq_text(value).replace(',', "&#44;")
}

// ============================================================================
// Tests
// ============================================================================

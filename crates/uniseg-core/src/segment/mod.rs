//! Canonical message segments.
//!
//! A [`Segment`] is the platform-agnostic unit of chat content. Inbound
//! native segments are converted into segments by the matcher registry, user
//! code builds and edits sequences of them, and exporters turn them back into
//! one platform's native format.
//!
//! Every variant:
//! - stringifies to a plain-text rendering (`[<type>]` unless overridden)
//! - compares structurally by its own fields only
//! - exposes a classification tag ([`Segment::segment_type`])
//! - may carry an [`Origin`] back-reference to the native segment it came from
//!
//! # Example
//!
//! ```rust,ignore
//! use uniseg_core::segment::{At, Image, Segment, Text};
//!
//! let msg = Segment::from(At::user("10001")) + " look: " + Image::from_url("example.com/a.png");
//! assert_eq!(msg.to_string(), "[at] look: [image]");
//! ```

mod custom;
mod hyper;
mod media;
mod reference;
mod text;

use std::fmt::{self, Debug, Display};

use serde::Serialize;
use serde_json::{Map, Value};

pub use custom::{Custom, CustomExportFn};
pub use hyper::{Hyper, HyperFormat};
pub use media::{Audio, File, Image, MediaFields, ResourceSource, Video, Voice};
pub use reference::{
    CustomNode, ForwardNode, MessageContent, RefNode, Reference, ReferenceContent, Reply,
};
pub use text::{Span, Styles, Text, TextRun};

use crate::message::UniMessage;
use crate::native::Origin;

// ============================================================================
// Segment Kind
// ============================================================================

/// Classification tag of a canonical segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Text,
    At,
    AtAll,
    Emoji,
    Image,
    Audio,
    Voice,
    Video,
    File,
    Reply,
    Reference,
    Hyper,
    Custom,
    Other,
}

impl SegmentKind {
    /// Kinds a platform builder can produce directly.
    pub const BUILDABLE: [SegmentKind; 12] = [
        Self::Text,
        Self::At,
        Self::AtAll,
        Self::Emoji,
        Self::Image,
        Self::Audio,
        Self::Voice,
        Self::Video,
        Self::File,
        Self::Reply,
        Self::Reference,
        Self::Hyper,
    ];

    /// Order in which the general recognition chain tries matchers.
    ///
    /// Mentions come before text so that a platform's text-like mention is not
    /// swallowed as plain text; `Custom` comes last before the `Other` fallback.
    pub const RECOGNITION_ORDER: [SegmentKind; 13] = [
        Self::AtAll,
        Self::At,
        Self::Emoji,
        Self::Image,
        Self::Video,
        Self::Voice,
        Self::Audio,
        Self::File,
        Self::Reply,
        Self::Reference,
        Self::Hyper,
        Self::Text,
        Self::Custom,
    ];

    /// The lowercase tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::At => "at",
            Self::AtAll => "atall",
            Self::Emoji => "emoji",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::File => "file",
            Self::Reply => "reply",
            Self::Reference => "reference",
            Self::Hyper => "hyper",
            Self::Custom => "custom",
            Self::Other => "other",
        }
    }

    /// Returns true for the resource-carrying kinds.
    pub const fn is_media(self) -> bool {
        matches!(
            self,
            Self::Image | Self::Audio | Self::Voice | Self::Video | Self::File
        )
    }
}

impl Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Back-reference
// ============================================================================

/// Optional origin slot carried by every variant except [`Other`].
///
/// Origins never take part in equality: two segments with the same fields are
/// equal regardless of where they came from.
#[derive(Clone, Default)]
pub(crate) struct Backref(Option<Origin>);

impl Backref {
    pub(crate) fn get(&self) -> Option<&Origin> {
        self.0.as_ref()
    }

    pub(crate) fn set(&mut self, origin: Origin) {
        self.0 = Some(origin);
    }
}

impl PartialEq for Backref {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Debug for Backref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(origin) => write!(f, "Backref({})", origin.segment_type()),
            None => f.write_str("Backref(None)"),
        }
    }
}

// ============================================================================
// Simple Variants
// ============================================================================

/// Target class of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AtFlag {
    #[default]
    User,
    Role,
    Channel,
}

/// Mention of a user, role, or channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct At {
    pub flag: AtFlag,
    pub target: String,
    pub display: Option<String>,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl At {
    pub fn new(flag: AtFlag, target: impl Into<String>) -> Self {
        Self {
            flag,
            target: target.into(),
            display: None,
            origin: Backref::default(),
        }
    }

    /// Mentions a user.
    pub fn user(target: impl Into<String>) -> Self {
        Self::new(AtFlag::User, target)
    }

    /// Mentions a role.
    pub fn role(target: impl Into<String>) -> Self {
        Self::new(AtFlag::Role, target)
    }

    /// References a channel.
    pub fn channel(target: impl Into<String>) -> Self {
        Self::new(AtFlag::Channel, target)
    }

    /// Sets the display name shown for the mention.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// Mention of everyone (`here == false`) or of everyone online (`here == true`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AtAll {
    pub here: bool,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl AtAll {
    pub fn new(here: bool) -> Self {
        Self {
            here,
            origin: Backref::default(),
        }
    }
}

/// Platform emoji or sticker face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emoji {
    pub id: String,
    pub name: Option<String>,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl Emoji {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            origin: Backref::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A native segment no matcher recognized, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Other {
    pub raw: Origin,
}

impl Other {
    pub fn new(raw: Origin) -> Self {
        Self { raw }
    }
}

// ============================================================================
// Segment Enum
// ============================================================================

/// A canonical message segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Text(Text),
    At(At),
    AtAll(AtAll),
    Emoji(Emoji),
    Image(Image),
    Audio(Audio),
    Voice(Voice),
    Video(Video),
    File(File),
    Reply(Reply),
    Reference(Reference),
    Hyper(Hyper),
    Custom(Custom),
    Other(Other),
}

impl Segment {
    /// Returns the variant kind.
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Text(_) => SegmentKind::Text,
            Segment::At(_) => SegmentKind::At,
            Segment::AtAll(_) => SegmentKind::AtAll,
            Segment::Emoji(_) => SegmentKind::Emoji,
            Segment::Image(_) => SegmentKind::Image,
            Segment::Audio(_) => SegmentKind::Audio,
            Segment::Voice(_) => SegmentKind::Voice,
            Segment::Video(_) => SegmentKind::Video,
            Segment::File(_) => SegmentKind::File,
            Segment::Reply(_) => SegmentKind::Reply,
            Segment::Reference(_) => SegmentKind::Reference,
            Segment::Hyper(_) => SegmentKind::Hyper,
            Segment::Custom(_) => SegmentKind::Custom,
            Segment::Other(_) => SegmentKind::Other,
        }
    }

    /// Returns the classification tag.
    ///
    /// This is the lowercase kind name, except for [`Custom`] whose `mstype`
    /// takes its place.
    pub fn segment_type(&self) -> &str {
        match self {
            Segment::Custom(custom) => &custom.mstype,
            other => other.kind().as_str(),
        }
    }

    /// Returns the variant's fields as an ordered mapping.
    pub fn data(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Returns the native segment this one was built from, if known.
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            Segment::Other(other) => Some(&other.raw),
            _ => self.backref().and_then(Backref::get),
        }
    }

    /// Attaches `origin` unless the segment already carries one.
    pub fn attach_origin(&mut self, origin: &Origin) {
        if let Some(slot) = self.backref_mut() {
            if slot.get().is_none() {
                slot.set(origin.clone());
            }
        }
    }

    /// Builder form of [`attach_origin`](Self::attach_origin).
    pub fn with_origin(mut self, origin: &Origin) -> Self {
        self.attach_origin(origin);
        self
    }

    /// Returns true if this is a [`Text`] segment.
    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }

    /// Returns the text payload if this is a [`Text`] segment.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Segment::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the shared resource fields of a media segment.
    pub fn media(&self) -> Option<&MediaFields> {
        match self {
            Segment::Image(seg) => Some(&seg.media),
            Segment::Audio(seg) => Some(&seg.media),
            Segment::Voice(seg) => Some(&seg.media),
            Segment::Video(seg) => Some(&seg.media),
            Segment::File(seg) => Some(&seg.media),
            _ => None,
        }
    }

    /// Mutable access to the shared resource fields of a media segment.
    pub fn media_mut(&mut self) -> Option<&mut MediaFields> {
        match self {
            Segment::Image(seg) => Some(&mut seg.media),
            Segment::Audio(seg) => Some(&mut seg.media),
            Segment::Voice(seg) => Some(&mut seg.media),
            Segment::Video(seg) => Some(&mut seg.media),
            Segment::File(seg) => Some(&mut seg.media),
            _ => None,
        }
    }

    fn backref(&self) -> Option<&Backref> {
        Some(match self {
            Segment::Text(seg) => &seg.origin,
            Segment::At(seg) => &seg.origin,
            Segment::AtAll(seg) => &seg.origin,
            Segment::Emoji(seg) => &seg.origin,
            Segment::Image(seg) => &seg.origin,
            Segment::Audio(seg) => &seg.origin,
            Segment::Voice(seg) => &seg.origin,
            Segment::Video(seg) => &seg.origin,
            Segment::File(seg) => &seg.origin,
            Segment::Reply(seg) => &seg.origin,
            Segment::Reference(seg) => &seg.origin,
            Segment::Hyper(seg) => &seg.origin,
            Segment::Custom(seg) => &seg.origin,
            Segment::Other(_) => return None,
        })
    }

    fn backref_mut(&mut self) -> Option<&mut Backref> {
        Some(match self {
            Segment::Text(seg) => &mut seg.origin,
            Segment::At(seg) => &mut seg.origin,
            Segment::AtAll(seg) => &mut seg.origin,
            Segment::Emoji(seg) => &mut seg.origin,
            Segment::Image(seg) => &mut seg.origin,
            Segment::Audio(seg) => &mut seg.origin,
            Segment::Voice(seg) => &mut seg.origin,
            Segment::Video(seg) => &mut seg.origin,
            Segment::File(seg) => &mut seg.origin,
            Segment::Reply(seg) => &mut seg.origin,
            Segment::Reference(seg) => &mut seg.origin,
            Segment::Hyper(seg) => &mut seg.origin,
            Segment::Custom(seg) => &mut seg.origin,
            Segment::Other(_) => return None,
        })
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Text(text) => Display::fmt(text, f),
            Segment::Other(other) => write!(f, "[{}]", other.raw.segment_type()),
            segment => write!(f, "[{}]", segment.segment_type()),
        }
    }
}

macro_rules! impl_into_segment {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Segment {
                fn from(segment: $variant) -> Self {
                    Segment::$variant(segment)
                }
            }

            impl From<$variant> for UniMessage {
                fn from(segment: $variant) -> Self {
                    UniMessage::from(Segment::$variant(segment))
                }
            }
        )*
    };
}

impl_into_segment!(
    Text, At, AtAll, Emoji, Image, Audio, Voice, Video, File, Reply, Reference, Hyper, Custom,
    Other,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::MessageSegment as _;
    use crate::native::tests::Probe;
    use serde_json::json;

    #[test]
    fn test_default_display_uses_type_tag() {
        assert_eq!(Segment::from(AtAll::new(false)).to_string(), "[atall]");
        assert_eq!(Segment::from(At::user("1")).to_string(), "[at]");
        assert_eq!(Segment::from(Emoji::new("178")).to_string(), "[emoji]");
        assert_eq!(Segment::from(Text::new("plain")).to_string(), "plain");
    }

    #[test]
    fn test_other_displays_native_type() {
        let raw = Origin::new(Probe::Tagged("poke", json!({"id": "1"})));
        let seg = Segment::from(Other::new(raw));
        assert_eq!(seg.segment_type(), "other");
        assert_eq!(seg.to_string(), "[poke]");
        assert_eq!(seg.origin().map(Origin::segment_type), Some("poke"));
    }

    #[test]
    fn test_data_lists_fields_in_order() {
        let seg = Segment::from(At::role("42").with_display("mods"));
        let keys: Vec<_> = seg.data().keys().cloned().collect();
        assert_eq!(keys, ["flag", "target", "display"]);
        assert_eq!(seg.data()["flag"], json!("role"));
    }

    #[test]
    fn test_origin_is_attached_once_and_ignored_by_equality() {
        let first = Origin::new(Probe::text("a"));
        let second = Origin::new(Probe::text("b"));

        let mut seg = Segment::from(Text::new("a"));
        seg.attach_origin(&first);
        seg.attach_origin(&second);
        assert_eq!(seg.origin(), Some(&first));

        assert_eq!(seg, Segment::from(Text::new("a")));
    }

    #[test]
    fn test_custom_type_tag_overrides_kind() {
        let seg = Segment::from(Custom::new("music", json!({"id": "1"})));
        assert_eq!(seg.kind(), SegmentKind::Custom);
        assert_eq!(seg.segment_type(), "music");
        assert_eq!(seg.to_string(), "[music]");
    }
}

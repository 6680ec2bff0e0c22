//! The canonical message container.
//!
//! [`UniMessage`] is an ordered sequence of [`Segment`]s. It is what builders
//! produce from native messages and what exporters consume.
//!
//! # Example
//!
//! ```rust,ignore
//! use uniseg_core::prelude::*;
//!
//! let msg = "hello " + At::user("10001") + Text::new("!").marked(0, 1, ["b"]);
//! assert_eq!(msg.to_string(), "hello [at]<b>!</b>");
//! assert!(msg.has(SegmentKind::At));
//! ```

use std::fmt::{self, Display};
use std::ops::{Add, Deref, DerefMut};

use serde::Serialize;

use crate::segment::{Segment, SegmentKind, Text};

/// An ordered sequence of canonical segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UniMessage {
    segments: Vec<Segment>,
}

impl UniMessage {
    /// Creates an empty message.
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Appends a segment; strings are lifted into [`Text`].
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, segment: impl Into<Segment>) -> Self {
        self.push(segment);
        self
    }

    /// Concatenates the raw text of every [`Text`] segment, ignoring styles.
    pub fn extract_plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(Segment::as_text)
            .map(|text| text.text.as_str())
            .collect()
    }

    /// Returns true if any segment is of `kind`.
    pub fn has(&self, kind: SegmentKind) -> bool {
        self.segments.iter().any(|seg| seg.kind() == kind)
    }

    /// Iterates over the segments of `kind`.
    pub fn filter(&self, kind: SegmentKind) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |seg| seg.kind() == kind)
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

impl Deref for UniMessage {
    type Target = [Segment];

    fn deref(&self) -> &Self::Target {
        &self.segments
    }
}

impl DerefMut for UniMessage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.segments
    }
}

impl Display for UniMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Segment::Text(Text::new(text))
    }
}

impl From<String> for Segment {
    fn from(text: String) -> Self {
        Segment::Text(Text::new(text))
    }
}

impl From<Segment> for UniMessage {
    fn from(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
        }
    }
}

impl From<&str> for UniMessage {
    fn from(text: &str) -> Self {
        Segment::from(text).into()
    }
}

impl From<String> for UniMessage {
    fn from(text: String) -> Self {
        Segment::from(text).into()
    }
}

impl From<Vec<Segment>> for UniMessage {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl<S: Into<Segment>> FromIterator<S> for UniMessage {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<Segment>> Extend<S> for UniMessage {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.segments.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for UniMessage {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a UniMessage {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

// ============================================================================
// Concatenation
// ============================================================================

impl<T: Into<UniMessage>> Add<T> for UniMessage {
    type Output = UniMessage;

    fn add(mut self, rhs: T) -> Self::Output {
        self.segments.extend(rhs.into().segments);
        self
    }
}

impl<T: Into<UniMessage>> Add<T> for Segment {
    type Output = UniMessage;

    fn add(self, rhs: T) -> Self::Output {
        UniMessage::from(self) + rhs
    }
}

impl Add<Segment> for &str {
    type Output = UniMessage;

    fn add(self, rhs: Segment) -> Self::Output {
        UniMessage::from(self) + rhs
    }
}

impl Add<UniMessage> for &str {
    type Output = UniMessage;

    fn add(self, rhs: UniMessage) -> Self::Output {
        UniMessage::from(self) + rhs
    }
}

macro_rules! impl_str_add {
    ($($variant:ident),* $(,)?) => {
        $(
            impl Add<crate::segment::$variant> for &str {
                type Output = UniMessage;

                fn add(self, rhs: crate::segment::$variant) -> Self::Output {
                    UniMessage::from(self) + rhs
                }
            }

            impl<T: Into<UniMessage>> Add<T> for crate::segment::$variant {
                type Output = UniMessage;

                fn add(self, rhs: T) -> Self::Output {
                    UniMessage::from(self) + rhs
                }
            }
        )*
    };
}

impl_str_add!(
    Text, At, AtAll, Emoji, Image, Audio, Voice, Video, File, Reply, Reference, Hyper, Custom,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{At, AtAll, Image};

    #[test]
    fn test_concatenation_lifts_strings() {
        let msg = "hello " + At::user("10001") + " and " + Image::from_id("img");
        assert_eq!(msg.len(), 4);
        assert!(msg[0].is_text());
        assert_eq!(msg[1].kind(), SegmentKind::At);
        assert_eq!(msg.to_string(), "hello [at] and [image]");
    }

    #[test]
    fn test_concatenation_keeps_operands() {
        let left = UniMessage::from("a");
        let right = Segment::from(AtAll::new(false));
        let joined = left.clone() + right.clone() + left.clone();
        assert_eq!(joined.to_string(), "a[atall]a");
        assert_eq!(left.len(), 1);
        assert_eq!(right.to_string(), "[atall]");
    }

    #[test]
    fn test_plain_text_ignores_styles_and_other_kinds() {
        let msg = Text::new("bold").marked(0, 4, ["b"]) + At::user("1") + "!";
        assert_eq!(msg.to_string(), "<b>bold</b>[at]!");
        assert_eq!(msg.extract_plain_text(), "bold!");
    }

    #[test]
    fn test_has_and_filter() {
        let msg: UniMessage = vec![
            Segment::from("x"),
            At::user("1").into(),
            At::role("2").into(),
        ]
        .into();
        assert!(msg.has(SegmentKind::At));
        assert!(!msg.has(SegmentKind::Image));
        assert_eq!(msg.filter(SegmentKind::At).count(), 2);
    }

    #[test]
    fn test_collect_and_extend() {
        let mut msg: UniMessage = ["a", "b"].into_iter().collect();
        msg.extend([At::user("1")]);
        msg.push("c");
        assert_eq!(msg.to_string(), "ab[at]c");
        assert_eq!(msg.into_segments().len(), 4);
    }
}

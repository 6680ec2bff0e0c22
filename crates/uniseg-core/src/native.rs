//! Native (platform-side) message types.
//!
//! Platform adapters describe their own wire segments and collect them in a
//! generic container. The canonical layer never inspects those types
//! directly; it goes through object-safe views instead.
//!
//! # Architecture
//!
//! - [`MessageSegment`]: a trait for one platform's segment type
//! - [`Message<S>`]: a generic struct holding a sequence of such segments
//! - [`RawSegment`] / [`Origin`]: a type-erased view of any native segment,
//!   used as the back-reference stored on canonical segments
//! - [`ErasedMessage`] / [`NativeMessage`]: a type-erased view of any native
//!   message, used where canonical content embeds an already-native payload
//!
//! Protocol adapters define their own segment types and use `Message<TheirSegment>`.

use std::any::Any;
use std::fmt::{self, Debug, Display};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// Message Segment Trait
// ============================================================================

/// A trait representing a single segment of a platform message.
///
/// Protocol adapters implement this trait for their segment types. The
/// `segment_type` and `data` pair is how a native segment is inspected
/// without knowing its concrete type: any value accepted by a matcher is
/// "something with a type tag and platform-specific data fields".
pub trait MessageSegment: Debug + Clone + Display + Send + Sync + 'static {
    /// Creates a plain text segment.
    fn text(text: impl Into<String>) -> Self;

    /// Returns the type identifier of this segment (e.g., "text", "image", "at").
    fn segment_type(&self) -> &str;

    /// Returns the platform data fields of this segment.
    fn data(&self) -> Map<String, Value>;

    /// Returns true if this is a plain text segment.
    fn is_text(&self) -> bool {
        self.segment_type() == "text"
    }

    /// Returns the text content if this is a text segment.
    fn as_text(&self) -> Option<&str>;
}

// ============================================================================
// Message Generic Struct
// ============================================================================

/// A generic native message composed of segments.
///
/// # Type Parameters
///
/// - `S`: The segment type, must implement [`MessageSegment`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message<S: MessageSegment> {
    #[serde(bound(deserialize = "S: Deserialize<'de>"))]
    segments: Vec<S>,
}

impl<S: MessageSegment> Message<S> {
    /// Creates a new empty message.
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Creates a message from a vector of segments.
    pub fn from_segments(segments: Vec<S>) -> Self {
        Self { segments }
    }

    /// Concatenates the text content of all text segments.
    pub fn extract_plain_text(&self) -> String {
        self.iter().filter_map(|seg| seg.as_text()).collect()
    }

    /// Adds a segment to the end of the message.
    pub fn push(&mut self, segment: S) {
        self.segments.push(segment);
    }

    /// Consumes the message and adds a segment (builder pattern).
    pub fn with(mut self, segment: S) -> Self {
        self.segments.push(segment);
        self
    }

    /// Consumes the message and returns the inner segments vector.
    pub fn into_segments(self) -> Vec<S> {
        self.segments
    }

    /// Returns the message as `[{"type": .., "data": {..}}, ..]`.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.iter()
                .map(|seg| {
                    let mut entry = Map::new();
                    entry.insert("type".into(), Value::String(seg.segment_type().into()));
                    entry.insert("data".into(), Value::Object(seg.data()));
                    Value::Object(entry)
                })
                .collect(),
        )
    }
}

impl<S: MessageSegment> Default for Message<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MessageSegment> Deref for Message<S> {
    type Target = [S];

    fn deref(&self) -> &Self::Target {
        &self.segments
    }
}

impl<S: MessageSegment> DerefMut for Message<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.segments
    }
}

impl<S: MessageSegment> Display for Message<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl<S: MessageSegment> From<Vec<S>> for Message<S> {
    fn from(segments: Vec<S>) -> Self {
        Self { segments }
    }
}

impl<S: MessageSegment> From<S> for Message<S> {
    fn from(segment: S) -> Self {
        Self {
            segments: vec![segment],
        }
    }
}

impl<S: MessageSegment> FromIterator<S> for Message<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl<S: MessageSegment> Extend<S> for Message<S> {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.segments.extend(iter);
    }
}

impl<S: MessageSegment> IntoIterator for Message<S> {
    type Item = S;
    type IntoIter = std::vec::IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a, S: MessageSegment> IntoIterator for &'a Message<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

// ============================================================================
// RawSegment / Origin
// ============================================================================

/// Object-safe view of any native segment.
///
/// Every [`MessageSegment`] is a `RawSegment` through the blanket impl, so
/// matchers can accept segments from any platform behind one reference type.
pub trait RawSegment: Any + Debug + Send + Sync {
    /// The platform type tag.
    fn raw_type(&self) -> &str;

    /// The platform data fields.
    fn raw_data(&self) -> Map<String, Value>;

    /// Returns a `&dyn Any` reference for downcasting to the concrete segment type.
    fn as_any(&self) -> &dyn Any;
}

impl<S: MessageSegment> RawSegment for S {
    fn raw_type(&self) -> &str {
        MessageSegment::segment_type(self)
    }

    fn raw_data(&self) -> Map<String, Value> {
        MessageSegment::data(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared handle to the native segment a canonical segment was built from.
///
/// Holding an `Origin` never implies ownership of anything platform-side;
/// it is a cheap clone of an immutable snapshot.
#[derive(Clone)]
pub struct Origin(Arc<dyn RawSegment>);

impl Origin {
    /// Wraps a native segment.
    pub fn new<R: RawSegment>(raw: R) -> Self {
        Self(Arc::new(raw))
    }

    /// The platform type tag of the wrapped segment.
    pub fn segment_type(&self) -> &str {
        self.0.raw_type()
    }

    /// The platform data fields of the wrapped segment.
    pub fn data(&self) -> Map<String, Value> {
        self.0.raw_data()
    }

    /// Borrows the wrapped segment as a trait object.
    pub fn raw(&self) -> &dyn RawSegment {
        &*self.0
    }

    /// Attempts to recover the concrete native segment.
    pub fn downcast_ref<R: Any>(&self) -> Option<&R> {
        self.0.as_any().downcast_ref::<R>()
    }
}

impl Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Origin").field(&self.0).finish()
    }
}

impl PartialEq for Origin {
    fn eq(&self, other: &Self) -> bool {
        self.segment_type() == other.segment_type() && self.data() == other.data()
    }
}

impl Serialize for Origin {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.segment_type())?;
        map.serialize_entry("data", &self.data())?;
        map.end()
    }
}

// ============================================================================
// ErasedMessage / NativeMessage
// ============================================================================

/// Object-safe, type-erased message trait.
///
/// Exporters downcast via [`ErasedMessage::as_any`] to recover the original
/// typed message when canonical content carries an already-native payload.
pub trait ErasedMessage: Any + Debug + Send + Sync {
    /// Returns a `&dyn Any` reference for downcasting to the concrete message type.
    fn as_any(&self) -> &dyn Any;

    /// Concatenated text content.
    fn extract_plain_text(&self) -> String;

    /// JSON view of the message.
    fn to_value(&self) -> Value;
}

impl<S: MessageSegment> ErasedMessage for Message<S> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn extract_plain_text(&self) -> String {
        Message::extract_plain_text(self)
    }

    fn to_value(&self) -> Value {
        Message::to_value(self)
    }
}

/// Shared handle to a native message of any platform.
#[derive(Clone)]
pub struct NativeMessage(Arc<dyn ErasedMessage>);

impl NativeMessage {
    /// Wraps a native message.
    pub fn new<M: ErasedMessage>(message: M) -> Self {
        Self(Arc::new(message))
    }

    /// Attempts to recover the concrete message type.
    pub fn downcast_ref<M: Any>(&self) -> Option<&M> {
        self.0.as_any().downcast_ref::<M>()
    }

    /// Concatenated text content.
    pub fn extract_plain_text(&self) -> String {
        self.0.extract_plain_text()
    }

    /// JSON view of the message.
    pub fn to_value(&self) -> Value {
        self.0.to_value()
    }
}

impl Debug for NativeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeMessage").field(&self.0).finish()
    }
}

impl PartialEq for NativeMessage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.to_value() == other.to_value()
    }
}

impl Serialize for NativeMessage {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<S: MessageSegment> From<Message<S>> for NativeMessage {
    fn from(message: Message<S>) -> Self {
        Self::new(message)
    }
}

//! Recognition of native segments.
//!
//! A [`UniPattern`] recognizes one canonical kind from a native segment, or
//! refuses. Refusal is ordinary control flow, not an error: the
//! [`PatternRegistry`] simply tries the next candidate and finally wraps the
//! segment as [`Other`].
//!
//! # Architecture
//!
//! - [`UniPattern`]: one recognizer for one canonical kind
//! - [`MessageBuilder`]: a platform's native → canonical conversion
//! - [`BuilderPattern`]: adapts a builder into one pattern per kind
//! - [`CustomPattern`]: the open, ordered table behind [`Custom`] recognition
//! - [`PatternRegistry`]: the directory of patterns keyed by kind
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use uniseg_core::pattern::{Condition, PatternRegistry};
//! use uniseg_core::segment::Custom;
//!
//! let mut registry = PatternRegistry::new();
//! registry.custom_mut().register("music", |raw| {
//!     Some(Custom::new("music", raw.data().into()))
//! });
//! ```

use std::fmt::{self, Debug};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::message::UniMessage;
use crate::native::{Message, MessageSegment, Origin, RawSegment};
use crate::segment::{Custom, Other, Segment, SegmentKind};

// ============================================================================
// Pattern Trait
// ============================================================================

/// Recognizer for one canonical kind.
pub trait UniPattern: Send + Sync {
    /// The kind this pattern produces.
    fn kind(&self) -> SegmentKind;

    /// Recognizes `raw`, or refuses with `None`.
    fn solve(&self, raw: &Origin) -> Option<Segment>;

    /// Recognizes `raw` and attaches it as the result's origin.
    ///
    /// An origin already set by [`solve`](Self::solve) is kept.
    fn convert(&self, raw: &Origin) -> Option<Segment> {
        self.solve(raw).map(|seg| seg.with_origin(raw))
    }
}

// ============================================================================
// Custom Pattern
// ============================================================================

/// Predicate over a native segment.
pub type Predicate = dyn Fn(&dyn RawSegment) -> bool + Send + Sync;

/// Builder producing a [`Custom`] segment from a native one.
pub type CustomBuildFn = dyn Fn(&Origin) -> Option<Custom> + Send + Sync;

/// When a custom builder applies.
#[derive(Clone)]
pub enum Condition {
    /// The native segment's type tag equals this string.
    Type(String),
    /// An arbitrary test over the native segment.
    Predicate(Arc<Predicate>),
}

impl Condition {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&dyn RawSegment) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Tests the condition against a native segment.
    pub fn matches(&self, raw: &dyn RawSegment) -> bool {
        match self {
            Condition::Type(tag) => raw.raw_type() == tag,
            Condition::Predicate(predicate) => predicate(raw),
        }
    }
}

impl Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Type(tag) => f.debug_tuple("Type").field(tag).finish(),
            Condition::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Condition {
    fn from(tag: &str) -> Self {
        Self::Type(tag.to_owned())
    }
}

impl From<String> for Condition {
    fn from(tag: String) -> Self {
        Self::Type(tag)
    }
}

/// Ordered table of custom recognizers.
///
/// Conditions are tried in registration order and the first one that matches
/// decides the outcome, even when its builder then refuses. Overlapping
/// conditions are therefore resolved by whoever registered first.
#[derive(Default, Clone)]
pub struct CustomPattern {
    builders: Vec<(Condition, Arc<CustomBuildFn>)>,
}

impl CustomPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a builder guarded by `condition`.
    pub fn register<F>(&mut self, condition: impl Into<Condition>, builder: F) -> &mut Self
    where
        F: Fn(&Origin) -> Option<Custom> + Send + Sync + 'static,
    {
        let condition = condition.into();
        debug!(condition = ?condition, "Registered custom segment builder");
        self.builders.push((condition, Arc::new(builder)));
        self
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl UniPattern for CustomPattern {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Custom
    }

    fn solve(&self, raw: &Origin) -> Option<Segment> {
        let (_, builder) = self
            .builders
            .iter()
            .find(|(condition, _)| condition.matches(raw.raw()))?;
        builder(raw).map(Segment::Custom)
    }
}

impl Debug for CustomPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.builders.iter().map(|(condition, _)| condition))
            .finish()
    }
}

// ============================================================================
// Message Builder
// ============================================================================

/// A platform's native → canonical conversion.
///
/// Implementors only write [`build`](Self::build); origin tracking and the
/// [`Other`] fallback are provided.
pub trait MessageBuilder: Send + Sync + 'static {
    /// The platform's native segment type.
    type Segment: MessageSegment;

    /// The platform identifier.
    fn adapter(&self) -> &'static str;

    /// Converts one native segment, or refuses.
    fn build(&self, native: &Self::Segment) -> Option<Segment>;

    /// Converts one native segment, wrapping refusals as [`Other`].
    fn convert(&self, native: &Self::Segment) -> Segment {
        let origin = Origin::new(native.clone());
        match self.build(native) {
            Some(seg) => seg.with_origin(&origin),
            None => Segment::Other(Other::new(origin)),
        }
    }

    /// Converts a whole native message.
    fn generate(&self, message: &Message<Self::Segment>) -> UniMessage {
        message.iter().map(|native| self.convert(native)).collect()
    }
}

/// Exposes a [`MessageBuilder`] as the pattern for one canonical kind.
///
/// Native segments of other platforms are refused, as are results of a
/// different kind.
pub struct BuilderPattern<B> {
    builder: Arc<B>,
    kind: SegmentKind,
}

impl<B: MessageBuilder> BuilderPattern<B> {
    pub fn new(builder: Arc<B>, kind: SegmentKind) -> Self {
        Self { builder, kind }
    }
}

impl<B: MessageBuilder> UniPattern for BuilderPattern<B> {
    fn kind(&self) -> SegmentKind {
        self.kind
    }

    fn solve(&self, raw: &Origin) -> Option<Segment> {
        let native = raw.downcast_ref::<B::Segment>()?;
        self.builder
            .build(native)
            .filter(|seg| seg.kind() == self.kind)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Directory of patterns keyed by the kind they produce.
///
/// Populated once while the runtime is being assembled and only read
/// afterwards; it is passed explicitly rather than kept in a global.
#[derive(Default, Clone)]
pub struct PatternRegistry {
    patterns: IndexMap<SegmentKind, Vec<Arc<dyn UniPattern>>>,
    custom: CustomPattern,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern under its kind, after any already registered.
    pub fn register<P: UniPattern + 'static>(&mut self, pattern: P) -> &mut Self {
        let kind = pattern.kind();
        self.patterns
            .entry(kind)
            .or_default()
            .push(Arc::new(pattern));
        self
    }

    /// Registers `builder` as a pattern for every buildable kind.
    pub fn register_builder<B: MessageBuilder>(&mut self, builder: B) -> &mut Self {
        let adapter = builder.adapter();
        let builder = Arc::new(builder);
        for kind in SegmentKind::BUILDABLE {
            self.register(BuilderPattern::new(Arc::clone(&builder), kind));
        }
        debug!(adapter, "Registered message builder");
        self
    }

    /// The custom recognizer table.
    pub fn custom(&self) -> &CustomPattern {
        &self.custom
    }

    /// Mutable access to the custom recognizer table.
    pub fn custom_mut(&mut self) -> &mut CustomPattern {
        &mut self.custom
    }

    /// Patterns registered for `kind`, in registration order.
    pub fn patterns(&self, kind: SegmentKind) -> &[Arc<dyn UniPattern>] {
        self.patterns.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Tries to recognize `raw` as `kind`.
    pub fn matches(&self, kind: SegmentKind, raw: &Origin) -> Option<Segment> {
        if kind == SegmentKind::Custom {
            if let Some(seg) = self.custom.convert(raw) {
                return Some(seg);
            }
        }
        self.patterns(kind)
            .iter()
            .find_map(|pattern| pattern.convert(raw))
    }

    /// Recognizes `raw` as whichever kind matches first.
    ///
    /// Kinds are tried in [`SegmentKind::RECOGNITION_ORDER`]; a segment no
    /// pattern accepts is kept verbatim as [`Other`].
    pub fn recognize(&self, raw: &Origin) -> Segment {
        SegmentKind::RECOGNITION_ORDER
            .into_iter()
            .find_map(|kind| self.matches(kind, raw))
            .unwrap_or_else(|| {
                debug!(raw_type = raw.segment_type(), "No pattern matched, keeping as other");
                Segment::Other(Other::new(raw.clone()))
            })
    }

    /// Recognizes every segment of a native message.
    pub fn recognize_message<S: MessageSegment>(&self, message: &Message<S>) -> UniMessage {
        message
            .iter()
            .map(|native| self.recognize(&Origin::new(native.clone())))
            .collect()
    }
}

impl Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRegistry")
            .field(
                "patterns",
                &self
                    .patterns
                    .iter()
                    .map(|(kind, patterns)| (kind, patterns.len()))
                    .collect::<Vec<_>>(),
            )
            .field("custom", &self.custom)
            .finish()
    }
}

/// A pattern defined by a closure.
pub struct FnPattern<F> {
    kind: SegmentKind,
    solve: F,
}

impl<F> FnPattern<F>
where
    F: Fn(&Origin) -> Option<Segment> + Send + Sync,
{
    pub fn new(kind: SegmentKind, solve: F) -> Self {
        Self { kind, solve }
    }
}

impl<F> UniPattern for FnPattern<F>
where
    F: Fn(&Origin) -> Option<Segment> + Send + Sync,
{
    fn kind(&self) -> SegmentKind {
        self.kind
    }

    fn solve(&self, raw: &Origin) -> Option<Segment> {
        (self.solve)(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::tests::Probe;
    use crate::segment::{At, Emoji, Text};
    use serde_json::{Value, json};

    struct ProbeBuilder;

    impl MessageBuilder for ProbeBuilder {
        type Segment = Probe;

        fn adapter(&self) -> &'static str {
            "probe"
        }

        fn build(&self, native: &Probe) -> Option<Segment> {
            match native {
                Probe::Text(text) => Some(Text::new(text.clone()).into()),
                Probe::Tagged("face", data) => Some(Emoji::new(data["id"].as_str()?).into()),
                Probe::Tagged("at", data) => Some(At::user(data["qq"].as_str()?).into()),
                Probe::Tagged(..) => None,
            }
        }
    }

    fn registry() -> PatternRegistry {
        let mut registry = PatternRegistry::new();
        registry.register_builder(ProbeBuilder);
        registry
    }

    #[test]
    fn test_builder_conversion_attaches_origin() {
        let raw = Origin::new(Probe::Tagged("face", json!({"id": "178"})));
        let seg = registry().recognize(&raw);
        assert_eq!(seg, Segment::from(Emoji::new("178")));
        assert_eq!(seg.origin(), Some(&raw));
    }

    #[test]
    fn test_builder_pattern_filters_by_kind() {
        let registry = registry();
        let raw = Origin::new(Probe::Tagged("at", json!({"qq": "1"})));
        assert!(registry.matches(SegmentKind::Text, &raw).is_none());
        assert!(registry.matches(SegmentKind::At, &raw).is_some());
    }

    #[test]
    fn test_unknown_segment_falls_back_to_other() {
        let raw = Origin::new(Probe::Tagged("poke", json!({"id": "1"})));
        let seg = registry().recognize(&raw);
        assert_eq!(seg.kind(), SegmentKind::Other);
        assert_eq!(seg.to_string(), "[poke]");
    }

    #[test]
    fn test_custom_conditions_in_registration_order() {
        let mut registry = registry();
        registry
            .custom_mut()
            .register(
                Condition::predicate(|raw| raw.raw_data().contains_key("id")),
                |raw| Some(Custom::new("first", Value::Object(raw.data()))),
            )
            .register("poke", |_| Some(Custom::new("second", Value::Null)));
        assert_eq!(registry.custom().len(), 2);

        let raw = Origin::new(Probe::Tagged("poke", json!({"id": "1"})));
        let seg = registry.recognize(&raw);
        assert_eq!(seg.segment_type(), "first");
        assert_eq!(seg.origin(), Some(&raw));

        let bare = Origin::new(Probe::Tagged("poke", json!({})));
        assert_eq!(registry.recognize(&bare).segment_type(), "second");
    }

    #[test]
    fn test_first_matching_condition_decides() {
        let mut registry = PatternRegistry::new();
        registry
            .custom_mut()
            .register("poke", |_| None)
            .register("poke", |_| Some(Custom::new("never", Value::Null)));

        let raw = Origin::new(Probe::Tagged("poke", json!({})));
        assert_eq!(registry.recognize(&raw).kind(), SegmentKind::Other);
    }

    #[test]
    fn test_fn_pattern_and_message_recognition() {
        let mut registry = registry();
        registry.register(FnPattern::new(SegmentKind::Text, |raw: &Origin| {
            (raw.segment_type() == "shout").then(|| Segment::from(Text::new("!")))
        }));

        let message: Message<Probe> = vec![
            Probe::text("hi "),
            Probe::Tagged("shout", json!({})),
            Probe::Tagged("at", json!({"qq": "2"})),
        ]
        .into();
        let uni = registry.recognize_message(&message);
        assert_eq!(uni.to_string(), "hi ![at]");

        let generated = ProbeBuilder.generate(&message);
        assert_eq!(generated.to_string(), "hi [shout][at]");
        assert_eq!(generated[1].kind(), SegmentKind::Other);
    }
}

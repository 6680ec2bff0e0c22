//! Error types for the canonical segment layer.
//!
//! Recognition refusal is not an error: matchers return `None`. What is left
//! are three distinct conditions:
//!
//! - [`SerializeFailed`]: an exporter has no rule to represent a segment
//! - [`MediaError`]: raw bytes were requested from media that carries none
//! - [`FetchError`]: a media download failed, or the platform cannot do it

use thiserror::Error;

use crate::segment::{Segment, SegmentKind};

// =============================================================================
// Serialization Errors
// =============================================================================

/// A canonical segment cannot be represented on the target platform.
///
/// Always carries the attempted kind and the original segment so the caller
/// can report it or substitute a fallback.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{adapter} cannot serialize {kind} segment {segment}{}", style_note(.style))]
pub struct SerializeFailed {
    /// Target platform.
    pub adapter: String,
    /// The variant kind that was being exported.
    pub kind: SegmentKind,
    /// Style name that had no native mapping, for styled text.
    pub style: Option<String>,
    /// The offending segment.
    pub segment: Box<Segment>,
}

impl SerializeFailed {
    /// Creates a serialization failure for `segment`.
    pub fn new(adapter: impl Into<String>, segment: impl Into<Segment>) -> Self {
        let segment = segment.into();
        Self {
            adapter: adapter.into(),
            kind: segment.kind(),
            style: None,
            segment: Box::new(segment),
        }
    }

    /// Creates a failure for a text style the platform cannot express.
    pub fn style(
        adapter: impl Into<String>,
        style: impl Into<String>,
        segment: impl Into<Segment>,
    ) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::new(adapter, segment)
        }
    }
}

fn style_note(style: &Option<String>) -> String {
    style
        .as_deref()
        .map(|style| format!(" (style '{style}')"))
        .unwrap_or_default()
}

// =============================================================================
// Media Errors
// =============================================================================

/// Errors raised by media accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// Raw bytes were requested but none are attached.
    #[error("media '{name}' has no raw data attached")]
    MissingRaw {
        /// Name of the media resource.
        name: String,
    },
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors that can occur while fetching media bytes.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The platform has no way to fetch this kind of reference.
    #[error("adapter '{adapter}' cannot fetch media by {by}")]
    NotImplemented {
        /// The platform that lacks the capability.
        adapter: String,
        /// What the lookup was keyed by ("id", "url").
        by: &'static str,
    },

    /// The fetch was attempted and failed.
    #[error("failed to fetch media: {0}")]
    Failed(String),

    /// I/O error while reading a local file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl FetchError {
    /// Creates a "not implemented" error.
    pub fn not_implemented(adapter: impl Into<String>, by: &'static str) -> Self {
        Self::NotImplemented {
            adapter: adapter.into(),
            by,
        }
    }

    /// Creates a generic fetch failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Returns true if the platform lacks the capability altogether.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for export operations.
pub type ExportResult<T> = Result<T, SerializeFailed>;

/// Result type for media fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Image, Text};

    #[test]
    fn test_serialize_failed_display() {
        let err = SerializeFailed::new("onebot", Image::from_url("https://a.b/c.png"));
        assert_eq!(err.kind, SegmentKind::Image);
        assert_eq!(err.to_string(), "onebot cannot serialize image segment [image]");

        let text = Text::new("hi").marked(0, 2, ["blink"]);
        let err = SerializeFailed::style("satori", "blink", text);
        assert_eq!(err.style.as_deref(), Some("blink"));
        assert_eq!(
            err.to_string(),
            "satori cannot serialize text segment <blink>hi</blink> (style 'blink')"
        );
    }

    #[test]
    fn test_fetch_error_kinds() {
        assert!(FetchError::not_implemented("ntchat", "id").is_not_implemented());
        assert!(!FetchError::failed("timeout").is_not_implemented());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(FetchError::from(io), FetchError::Io(msg) if msg == "gone"));
    }
}

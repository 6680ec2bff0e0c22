//! Replies and forwarded-message references.
//!
//! [`Reply`], [`Reference`] and [`CustomNode`] can nest content: plain text,
//! a canonical [`UniMessage`], or an already-native message. This is what
//! allows recursive quoting and forwarding trees.

use serde::Serialize;
use time::OffsetDateTime;

use super::Backref;
use crate::message::UniMessage;
use crate::native::NativeMessage;

// ============================================================================
// Nested Content
// ============================================================================

/// Content nested inside a reply or a forward node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Segments(UniMessage),
    Native(NativeMessage),
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<UniMessage> for MessageContent {
    fn from(message: UniMessage) -> Self {
        Self::Segments(message)
    }
}

impl From<NativeMessage> for MessageContent {
    fn from(message: NativeMessage) -> Self {
        Self::Native(message)
    }
}

// ============================================================================
// Reply
// ============================================================================

/// Reply to (quote of) an existing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// Platform-specific reference; not necessarily a message id.
    pub id: String,
    /// The quoted content, when known.
    pub msg: Option<MessageContent>,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl Reply {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            msg: None,
            origin: Backref::default(),
        }
    }

    pub fn with_msg(mut self, msg: impl Into<MessageContent>) -> Self {
        self.msg = Some(msg.into());
        self
    }
}

// ============================================================================
// Forward Nodes
// ============================================================================

/// Forward entry pointing at an existing remote message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefNode {
    pub id: String,
    pub context: Option<String>,
}

impl RefNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context: None,
        }
    }

    /// Sets the conversation the message lives in.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Forward entry synthesized locally, not backed by a remote message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomNode {
    /// Author id.
    pub uid: String,
    /// Author display name.
    pub name: String,
    #[serde(with = "time::serde::timestamp")]
    pub time: OffsetDateTime,
    pub content: MessageContent,
}

impl CustomNode {
    /// Creates a node stamped with the current time.
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<MessageContent>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            time: OffsetDateTime::now_utc(),
            content: content.into(),
        }
    }

    pub fn with_time(mut self, time: OffsetDateTime) -> Self {
        self.time = time;
        self
    }
}

/// One entry of a forward bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForwardNode {
    Ref(RefNode),
    Custom(CustomNode),
}

impl From<RefNode> for ForwardNode {
    fn from(node: RefNode) -> Self {
        Self::Ref(node)
    }
}

impl From<CustomNode> for ForwardNode {
    fn from(node: CustomNode) -> Self {
        Self::Custom(node)
    }
}

// ============================================================================
// Reference
// ============================================================================

/// Content of a [`Reference`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReferenceContent {
    /// A single text message to forward.
    Text(String),
    /// An ordered forward bundle.
    Nodes(Vec<ForwardNode>),
    /// An already-native forward payload.
    Native(NativeMessage),
}

/// A quoted existing message or a forward bundle.
///
/// With no content, the reference points at an existing message (or an
/// existing forward) by id. With content, it is a forward.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Reference {
    pub id: Option<String>,
    pub content: Option<ReferenceContent>,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl Reference {
    /// A reference to an existing message or forward.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// A forward bundle of nodes.
    pub fn forward<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ForwardNode>,
    {
        Self {
            content: Some(ReferenceContent::Nodes(
                nodes.into_iter().map(Into::into).collect(),
            )),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_content(mut self, content: ReferenceContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Returns true if this reference carries forwarded content.
    pub fn is_forward(&self) -> bool {
        self.content.is_some()
    }
}

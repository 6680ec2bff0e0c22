//! Satori message elements.
//!
//! Satori messages are sequences of XHTML-like elements. An [`Element`] is
//! one top-level node; style, quote and message elements nest children.
//! `Display` renders the element markup:
//!
//! ```text
//! hello <at id="10001" name="Alice"/><b>bold <i>both</i></b><br/>
//! ```
//!
//! Text and attribute values are escaped (`&` `<` `>` `"`).

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use uniseg_core::MessageSegment;

// ============================================================================
// Element Enum
// ============================================================================

/// A Satori message element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Element {
    Text(TextData),
    /// Mention of a user, a role, or everyone.
    At(AtData),
    /// Channel reference.
    Sharp(SharpData),
    /// Hyperlink.
    #[serde(rename = "a")]
    Link(LinkData),
    #[serde(rename = "img")]
    Image(ResourceData),
    Audio(ResourceData),
    Video(ResourceData),
    File(ResourceData),
    /// Presentation element (`<b>`, `<i>`, ...) wrapping children.
    Style(StyleData),
    /// Line break.
    Br,
    /// Quoted message.
    Quote(QuoteData),
    /// Author of a forwarded message.
    Author(AuthorData),
    /// A message, possibly forwarded, possibly with content.
    Message(MessageData),
}

/// Presentation tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleTag {
    #[serde(rename = "b")]
    Bold,
    #[serde(rename = "i")]
    Italic,
    #[serde(rename = "u")]
    Underline,
    #[serde(rename = "s")]
    Strikethrough,
    #[serde(rename = "spl")]
    Spoiler,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "sup")]
    Superscript,
    #[serde(rename = "sub")]
    Subscript,
    #[serde(rename = "p")]
    Paragraph,
}

impl StyleTag {
    pub const ALL: [StyleTag; 9] = [
        StyleTag::Bold,
        StyleTag::Italic,
        StyleTag::Underline,
        StyleTag::Strikethrough,
        StyleTag::Spoiler,
        StyleTag::Code,
        StyleTag::Superscript,
        StyleTag::Subscript,
        StyleTag::Paragraph,
    ];

    /// The element tag name.
    pub const fn as_str(self) -> &'static str {
        match self {
            StyleTag::Bold => "b",
            StyleTag::Italic => "i",
            StyleTag::Underline => "u",
            StyleTag::Strikethrough => "s",
            StyleTag::Spoiler => "spl",
            StyleTag::Code => "code",
            StyleTag::Superscript => "sup",
            StyleTag::Subscript => "sub",
            StyleTag::Paragraph => "p",
        }
    }

    /// Alternative style names that map to this tag.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            StyleTag::Bold => &["strong", "bold"],
            StyleTag::Italic => &["em", "italic"],
            StyleTag::Underline => &["ins", "underline"],
            StyleTag::Strikethrough => &["del", "strike", "strikethrough"],
            StyleTag::Spoiler => &["spoiler"],
            StyleTag::Code => &[],
            StyleTag::Superscript => &["superscript"],
            StyleTag::Subscript => &["subscript"],
            StyleTag::Paragraph => &["paragraph"],
        }
    }
}

impl Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Element Data Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// `"all"` or `"here"` for collective mentions.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub at_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpData {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Source of an `img`, `audio`, `video` or `file` element.
///
/// `src` is a URL: `https://`, `file://` or `data:` all occur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleData {
    pub tag: StyleTag,
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub forward: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

// ============================================================================
// Constructors
// ============================================================================

impl Element {
    /// Mentions a user.
    pub fn at(id: impl Into<String>, name: Option<String>) -> Self {
        Element::At(AtData {
            id: Some(id.into()),
            name,
            ..AtData::default()
        })
    }

    /// Mentions a role.
    pub fn at_role(role: impl Into<String>, name: Option<String>) -> Self {
        Element::At(AtData {
            role: Some(role.into()),
            name,
            ..AtData::default()
        })
    }

    /// Mentions everyone, or everyone online when `here` is set.
    pub fn at_all(here: bool) -> Self {
        Element::At(AtData {
            at_type: Some(if here { "here" } else { "all" }.to_string()),
            ..AtData::default()
        })
    }

    pub fn sharp(id: impl Into<String>, name: Option<String>) -> Self {
        Element::Sharp(SharpData {
            id: id.into(),
            name,
        })
    }

    pub fn link(href: impl Into<String>) -> Self {
        Element::Link(LinkData {
            href: href.into(),
            text: None,
        })
    }

    pub fn image(src: impl Into<String>) -> Self {
        Element::Image(ResourceData::new(src))
    }

    pub fn audio(src: impl Into<String>) -> Self {
        Element::Audio(ResourceData::new(src))
    }

    pub fn video(src: impl Into<String>) -> Self {
        Element::Video(ResourceData::new(src))
    }

    pub fn file(src: impl Into<String>) -> Self {
        Element::File(ResourceData::new(src))
    }

    /// Wraps children in a presentation element.
    pub fn style(tag: StyleTag, children: Vec<Element>) -> Self {
        Element::Style(StyleData { tag, children })
    }

    pub fn br() -> Self {
        Element::Br
    }

    pub fn quote(id: impl Into<String>, children: Vec<Element>) -> Self {
        Element::Quote(QuoteData {
            id: Some(id.into()),
            children,
        })
    }

    pub fn author(id: impl Into<String>, name: impl Into<String>) -> Self {
        Element::Author(AuthorData {
            id: Some(id.into()),
            name: Some(name.into()),
            avatar: None,
        })
    }

    pub fn message(id: Option<String>, forward: bool, children: Vec<Element>) -> Self {
        Element::Message(MessageData {
            id,
            forward,
            children,
        })
    }

    /// Children of a container element; empty for leaves.
    pub fn children(&self) -> &[Element] {
        match self {
            Element::Style(data) => &data.children,
            Element::Quote(data) => &data.children,
            Element::Message(data) => &data.children,
            _ => &[],
        }
    }
}

impl ResourceData {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            title: None,
        }
    }
}

impl MessageSegment for Element {
    fn text(text: impl Into<String>) -> Self {
        Element::Text(TextData { text: text.into() })
    }

    fn segment_type(&self) -> &str {
        match self {
            Element::Text(_) => "text",
            Element::At(_) => "at",
            Element::Sharp(_) => "sharp",
            Element::Link(_) => "a",
            Element::Image(_) => "img",
            Element::Audio(_) => "audio",
            Element::Video(_) => "video",
            Element::File(_) => "file",
            Element::Style(data) => data.tag.as_str(),
            Element::Br => "br",
            Element::Quote(_) => "quote",
            Element::Author(_) => "author",
            Element::Message(_) => "message",
        }
    }

    fn data(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut element)) => match element.remove("data") {
                Some(Value::Object(data)) => data,
                _ => Map::new(),
            },
            _ => Map::new(),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Element::Text(data) => Some(&data.text),
            _ => None,
        }
    }
}

// ============================================================================
// Markup Rendering
// ============================================================================

enum Attr<'a> {
    Str(&'a str, Option<&'a str>),
    Flag(&'a str, bool),
}

fn write_element(
    f: &mut fmt::Formatter<'_>,
    tag: &str,
    attrs: &[Attr<'_>],
    children: &[Element],
) -> fmt::Result {
    write!(f, "<{tag}")?;
    for attr in attrs {
        match attr {
            Attr::Str(key, Some(value)) => write!(f, " {key}=\"{}\"", escape(value))?,
            Attr::Flag(key, true) => write!(f, " {key}")?,
            Attr::Str(_, None) | Attr::Flag(_, false) => {}
        }
    }
    if children.is_empty() {
        return f.write_str("/>");
    }
    f.write_str(">")?;
    for child in children {
        Display::fmt(child, f)?;
    }
    write!(f, "</{tag}>")
}

impl Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Attr::Str;
        match self {
            Element::Text(data) => f.write_str(&escape(&data.text)),
            Element::At(data) => write_element(
                f,
                "at",
                &[
                    Str("id", data.id.as_deref()),
                    Str("name", data.name.as_deref()),
                    Str("role", data.role.as_deref()),
                    Str("type", data.at_type.as_deref()),
                ],
                &[],
            ),
            Element::Sharp(data) => write_element(
                f,
                "sharp",
                &[
                    Str("id", Some(&data.id)),
                    Str("name", data.name.as_deref()),
                ],
                &[],
            ),
            Element::Link(data) => {
                let text = data.text.clone().map(Element::text);
                write_element(
                    f,
                    "a",
                    &[Str("href", Some(&data.href))],
                    text.as_slice(),
                )
            }
            Element::Image(data)
            | Element::Audio(data)
            | Element::Video(data)
            | Element::File(data) => write_element(
                f,
                self.segment_type(),
                &[
                    Str("src", Some(&data.src)),
                    Str("title", data.title.as_deref()),
                ],
                &[],
            ),
            Element::Style(data) => write_element(f, data.tag.as_str(), &[], &data.children),
            Element::Br => f.write_str("<br/>"),
            Element::Quote(data) => {
                write_element(f, "quote", &[Str("id", data.id.as_deref())], &data.children)
            }
            Element::Author(data) => write_element(
                f,
                "author",
                &[
                    Str("id", data.id.as_deref()),
                    Str("name", data.name.as_deref()),
                    Str("avatar", data.avatar.as_deref()),
                ],
                &[],
            ),
            Element::Message(data) => write_element(
                f,
                "message",
                &[
                    Str("id", data.id.as_deref()),
                    Attr::Flag("forward", data.forward),
                ],
                &data.children,
            ),
        }
    }
}

/// Escapes text and attribute values for element markup.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Reverses [`escape`].
pub fn unescape(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_markup() {
        assert_eq!(Element::text("a < b & \"c\"").to_string(), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(
            Element::at("10001", Some("Alice".into())).to_string(),
            r#"<at id="10001" name="Alice"/>"#
        );
        assert_eq!(Element::at_all(true).to_string(), r#"<at type="here"/>"#);
        assert_eq!(
            Element::image("https://example.com/a.png?x=1&y=2").to_string(),
            r#"<img src="https://example.com/a.png?x=1&amp;y=2"/>"#
        );
        assert_eq!(Element::br().to_string(), "<br/>");
    }

    #[test]
    fn test_nested_markup() {
        let styled = Element::style(
            StyleTag::Bold,
            vec![
                Element::text("bold "),
                Element::style(StyleTag::Italic, vec![Element::text("both")]),
            ],
        );
        assert_eq!(styled.to_string(), "<b>bold <i>both</i></b>");

        let forward = Element::message(
            None,
            true,
            vec![Element::message(Some("1".into()), false, vec![])],
        );
        assert_eq!(forward.to_string(), r#"<message forward><message id="1"/></message>"#);
    }

    #[test]
    fn test_segment_type_and_data() {
        let styled = Element::style(StyleTag::Spoiler, vec![Element::text("x")]);
        assert_eq!(styled.segment_type(), "spl");
        assert!(!styled.is_text());

        let at = Element::at_role("admins", None);
        assert_eq!(Value::Object(at.data()), json!({"role": "admins"}));
        assert_eq!(Element::text("t").as_text(), Some("t"));
    }

    #[test]
    fn test_escape_roundtrip() {
        let raw = r#"<a href="x">&amp;</a>"#;
        assert_eq!(unescape(&escape(raw)), raw);
    }
}

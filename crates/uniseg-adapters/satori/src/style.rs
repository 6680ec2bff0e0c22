//! Style name → presentation element mapping.
//!
//! Canonical text styles are free-form names. The exporter resolves each
//! name through a [`StyleRegistry`]; a name with no handler makes export fail
//! with the style attached to the error.

use std::fmt::{self, Debug};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::model::{Element, StyleTag};

/// Wraps already-exported children in an element.
pub type StyleHandler = dyn Fn(Vec<Element>) -> Element + Send + Sync;

/// Registered style handlers, keyed by style name.
///
/// The default registry maps every [`StyleTag`] by its tag name and its
/// aliases (`strong`, `em`, `del`, `spoiler`, ...).
#[derive(Clone)]
pub struct StyleRegistry {
    handlers: IndexMap<String, Arc<StyleHandler>>,
}

impl StyleRegistry {
    /// Creates a registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// Registers a handler for `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Vec<Element>) -> Element + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(style = %name, "Registered style handler");
        self.handlers.insert(name, Arc::new(handler));
        self
    }

    /// Maps `name` to a built-in presentation tag.
    pub fn register_tag(&mut self, name: impl Into<String>, tag: StyleTag) -> &mut Self {
        self.register(name, move |children| Element::style(tag, children))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Wraps `children` in the element registered for `name`.
    pub fn apply(&self, name: &str, children: Vec<Element>) -> Option<Element> {
        self.handlers.get(name).map(|handler| handler(children))
    }

    /// Registered style names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for tag in StyleTag::ALL {
            registry.register_tag(tag.as_str(), tag);
            for alias in tag.aliases() {
                registry.register_tag(*alias, tag);
            }
        }
        for name in ["a", "link"] {
            registry.register(name, link_from_children);
        }
        registry
    }
}

/// Uses the rendered children as the link target.
fn link_from_children(children: Vec<Element>) -> Element {
    Element::link(children.iter().map(ToString::to_string).collect::<String>())
}

impl Debug for StyleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("styles", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uniseg_core::MessageSegment;

    #[test]
    fn test_default_aliases() {
        let registry = StyleRegistry::default();
        let bold = registry.apply("strong", vec![Element::text("x")]).unwrap();
        assert_eq!(bold, Element::style(StyleTag::Bold, vec![Element::text("x")]));
        assert!(registry.contains("spl"));
        assert!(registry.contains("strikethrough"));
        assert!(!registry.contains("blink"));
    }

    #[test]
    fn test_custom_handler() {
        let mut registry = StyleRegistry::empty();
        registry.register("quote", |children| {
            let text = children.iter().map(ToString::to_string).collect::<String>();
            Element::text(format!("> {text}"))
        });
        assert_eq!(registry.names().collect::<Vec<_>>(), ["quote"]);
        assert_eq!(
            registry.apply("quote", vec![Element::text("hi")]),
            Some(Element::text("> hi"))
        );
        assert_eq!(registry.apply("b", vec![]), None);
    }

    #[test]
    fn test_default_link_handlers() {
        let registry = StyleRegistry::default();
        for name in ["a", "link"] {
            assert_eq!(
                registry.apply(name, vec![Element::text("https://a.b")]),
                Some(Element::link("https://a.b"))
            );
        }
    }
}

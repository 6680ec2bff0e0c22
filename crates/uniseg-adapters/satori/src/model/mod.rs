//! Satori message model.

pub mod element;

pub use element::{
    AtData, AuthorData, Element, LinkData, MessageData, QuoteData, ResourceData, SharpData,
    StyleData, StyleTag, TextData, escape, unescape,
};

use uniseg_core::Message;

/// A Satori message: an ordered sequence of top-level elements.
///
/// Its `Display` form is the message markup.
pub type SatoriMessage = Message<Element>;

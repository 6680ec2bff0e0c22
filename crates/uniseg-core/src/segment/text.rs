//! Style-annotated text.
//!
//! A [`Text`] carries a set of half-open character intervals, each annotated
//! with an ordered list of style names. Intervals are kept in a canonical
//! form: after every mutation they are expanded per character, grouped by the
//! exact style list each character ends up with, and collapsed back into
//! maximal runs sorted by start. Two characters carrying the same style list
//! therefore always end up in one run, even when the list arose from
//! different overlapping marks.
//!
//! Rendering emits each run as nested tags (opened in stored order, closed in
//! reverse), then removes `</x><x>` pairs left behind by abutting runs that
//! share a style.
//!
//! # Example
//!
//! ```rust,ignore
//! use uniseg_core::segment::Text;
//!
//! let text = Text::new("hello").marked(0, 3, ["b"]).marked(3, 5, ["b", "i"]);
//! assert_eq!(text.to_string(), "<b>hel<i>lo</i></b>");
//! ```
//!
//! Character positions count Unicode scalar values, not bytes.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::Backref;

/// Half-open `[start, end)` character interval.
pub type Span = (usize, usize);

// ============================================================================
// Styles
// ============================================================================

/// Interval → style-list mapping of a [`Text`].
///
/// Iteration follows insertion order, which for a merged set is ascending
/// start order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Styles(IndexMap<Span, Vec<String>>);

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Styles stored for exactly `span`.
    pub fn get(&self, span: Span) -> Option<&[String]> {
        self.0.get(&span).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Span, &[String])> {
        self.0.iter().map(|(span, styles)| (*span, styles.as_slice()))
    }

    /// Length of the longest style list.
    pub fn max_depth(&self) -> usize {
        self.0.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Appends styles to the entry for `span`, skipping names it already has.
    fn insert<I>(&mut self, span: Span, styles: I)
    where
        I: IntoIterator<Item = String>,
    {
        let entry = self.0.entry(span).or_default();
        for style in styles {
            if !entry.contains(&style) {
                entry.push(style);
            }
        }
    }

    /// Returns the canonical form of this mapping.
    ///
    /// Entries without any style name and empty intervals contribute nothing.
    pub fn merged(&self) -> Self {
        let mut per_char: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (&(start, end), styles) in &self.0 {
            if styles.is_empty() {
                continue;
            }
            for index in start..end {
                let slot = per_char.entry(index).or_default();
                for style in styles {
                    if !slot.contains(&style.as_str()) {
                        slot.push(style);
                    }
                }
            }
        }

        // BTreeMap iteration keeps each group's indices ascending.
        let mut groups: IndexMap<Vec<&str>, Vec<usize>> = IndexMap::new();
        for (index, styles) in per_char {
            groups.entry(styles).or_default().push(index);
        }

        let mut runs: Vec<(Span, Vec<String>)> = Vec::new();
        for (styles, indices) in groups {
            let Some((&first, rest)) = indices.split_first() else {
                continue;
            };
            let styles: Vec<String> = styles.into_iter().map(str::to_owned).collect();
            let (mut start, mut prev) = (first, first);
            for &index in rest {
                if index - prev != 1 {
                    runs.push(((start, prev + 1), styles.clone()));
                    start = index;
                }
                prev = index;
            }
            runs.push(((start, prev + 1), styles));
        }
        runs.sort_by_key(|((start, _), _)| *start);

        Self(runs.into_iter().collect())
    }
}

impl FromIterator<(Span, Vec<String>)> for Styles {
    fn from_iter<T: IntoIterator<Item = (Span, Vec<String>)>>(iter: T) -> Self {
        let mut styles = Self::new();
        for (span, names) in iter {
            styles.insert(span, names);
        }
        styles
    }
}

impl Serialize for Styles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|(&(start, end), styles)| (start, end, styles)))
    }
}

// ============================================================================
// Text
// ============================================================================

/// A contiguous piece of text sharing one style list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    /// Outermost style first; empty for unstyled text.
    pub styles: Vec<String>,
}

/// Plain text with style annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
    styles: Styles,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl Text {
    /// Creates unstyled text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            styles: Styles::new(),
            origin: Backref::default(),
        }
    }

    /// Creates text with initial style intervals.
    ///
    /// Entries are applied in iteration order, which decides the nesting of
    /// overlapping styles.
    pub fn with_styles<I>(text: impl Into<String>, styles: I) -> Self
    where
        I: IntoIterator<Item = (Span, Vec<String>)>,
    {
        Self {
            text: text.into(),
            styles: styles.into_iter().collect::<Styles>().merged(),
            origin: Backref::default(),
        }
    }

    /// The merged style intervals.
    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Number of characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Annotates `[start, end)` with `styles` and re-merges.
    pub fn mark<I, S>(&mut self, start: usize, end: usize, styles: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.styles
            .insert((start, end), styles.into_iter().map(Into::into));
        self.merge()
    }

    /// Builder form of [`mark`](Self::mark).
    pub fn marked<I, S>(mut self, start: usize, end: usize, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mark(start, end, styles);
        self
    }

    /// Rebuilds the canonical interval set.
    pub fn merge(&mut self) -> &mut Self {
        if !self.styles.is_empty() {
            self.styles = self.styles.merged();
        }
        self
    }

    /// Style list of the widest interval; the first one wins ties.
    pub fn extract_most_styles(&self) -> &[String] {
        let mut widest: Option<(usize, &[String])> = None;
        for ((start, end), styles) in self.styles.iter() {
            let width = end.saturating_sub(start);
            if widest.is_none_or(|(best, _)| width > best) {
                widest = Some((width, styles));
            }
        }
        widest.map(|(_, styles)| styles).unwrap_or(&[])
    }

    /// Outermost style of the widest interval.
    pub fn extract_most_style(&self) -> Option<&str> {
        self.extract_most_styles().first().map(String::as_str)
    }

    /// Splits the text into styled and unstyled runs, in order.
    ///
    /// Unstyled text yields a single run, even when empty.
    pub fn runs(&self) -> Vec<TextRun> {
        if self.styles.is_empty() {
            return vec![TextRun {
                text: self.text.clone(),
                styles: Vec::new(),
            }];
        }

        let chars: Vec<char> = self.text.chars().collect();
        let mut runs = Vec::new();
        let mut cursor = 0;
        for ((start, end), styles) in self.styles.iter() {
            let gap = slice(&chars, cursor, start);
            if !gap.is_empty() {
                runs.push(TextRun {
                    text: gap,
                    styles: Vec::new(),
                });
            }
            let body = slice(&chars, start, end);
            if !body.is_empty() {
                runs.push(TextRun {
                    text: body,
                    styles: styles.to_vec(),
                });
            }
            cursor = end;
        }
        let tail = slice(&chars, cursor, chars.len());
        if !tail.is_empty() {
            runs.push(TextRun {
                text: tail,
                styles: Vec::new(),
            });
        }
        runs
    }

    /// Renders the text as nested markup.
    pub fn render(&self) -> String {
        if self.styles.is_empty() {
            return self.text.clone();
        }

        let chars: Vec<char> = self.text.chars().collect();
        let mut out = String::with_capacity(self.text.len() * 2);
        let mut cursor = 0;
        for ((start, end), styles) in self.styles.iter() {
            out.push_str(&slice(&chars, cursor, start));
            for style in styles {
                out.push('<');
                out.push_str(style);
                out.push('>');
            }
            out.push_str(&slice(&chars, start, end));
            for style in styles.iter().rev() {
                out.push_str("</");
                out.push_str(style);
                out.push('>');
            }
            cursor = end;
        }
        out.push_str(&slice(&chars, cursor, chars.len()));

        for _ in 0..self.styles.max_depth() {
            out = collapse_reopened_tags(&out);
        }
        out
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Characters in `[start, end)`, clamped to the text.
fn slice(chars: &[char], start: usize, end: usize) -> String {
    let end = end.min(chars.len());
    let start = start.min(end);
    chars[start..end].iter().collect()
}

// ============================================================================
// Tag cleanup
// ============================================================================

/// One left-to-right pass removing `</x><x>` pairs.
///
/// `x` is a run of word characters; the paragraph tag `p` is never joined.
fn collapse_reopened_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(ch) = rest.chars().next() {
        if let Some(len) = reopened_tag_len(rest) {
            rest = &rest[len..];
            continue;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Byte length of a `</x><x>` pair at the start of `input`.
fn reopened_tag_len(input: &str) -> Option<usize> {
    let body = input.strip_prefix("</")?;
    let name_len = body.find(|c: char| !is_word_char(c))?;
    let name = &body[..name_len];
    if name.is_empty() || name == "p" {
        return None;
    }
    let reopened = body[name_len..].strip_prefix("><")?;
    reopened.strip_prefix(name)?.strip_prefix('>')?;
    Some(2 * name_len + 5)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

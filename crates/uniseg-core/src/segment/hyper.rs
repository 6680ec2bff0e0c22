use serde::Serialize;
use serde_json::Value;

use super::Backref;

/// Encoding of a rich card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HyperFormat {
    Xml,
    Json,
}

/// Rich card content (XML or JSON).
///
/// For JSON cards `raw` and `content` are kept mutually derivable: whichever
/// side is given fills in the other when possible. A `raw` string that does
/// not parse into an object or array leaves `content` unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hyper {
    pub format: HyperFormat,
    pub raw: Option<String>,
    pub content: Option<Value>,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl Hyper {
    pub fn new(format: HyperFormat, raw: Option<String>, content: Option<Value>) -> Self {
        let mut hyper = Self {
            format,
            raw,
            content,
            origin: Backref::default(),
        };
        hyper.sync();
        hyper
    }

    /// An XML card from its source.
    pub fn xml(raw: impl Into<String>) -> Self {
        Self::new(HyperFormat::Xml, Some(raw.into()), None)
    }

    /// A JSON card from its source text.
    pub fn json(raw: impl Into<String>) -> Self {
        Self::new(HyperFormat::Json, Some(raw.into()), None)
    }

    /// A JSON card from a structured value.
    pub fn json_value(content: Value) -> Self {
        Self::new(HyperFormat::Json, None, Some(content))
    }

    fn sync(&mut self) {
        if self.format != HyperFormat::Json {
            return;
        }
        if self.content.is_none() {
            if let Some(raw) = self.raw.as_deref().filter(|raw| !raw.is_empty()) {
                self.content = serde_json::from_str::<Value>(raw)
                    .ok()
                    .filter(|value| value.is_object() || value.is_array());
            }
        } else if self.raw.is_none() {
            self.raw = self
                .content
                .as_ref()
                .and_then(|content| serde_json::to_string(content).ok());
        }
    }
}

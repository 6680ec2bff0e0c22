//! User-defined segments.
//!
//! Unlike every other variant, a [`Custom`] segment carries its own export
//! logic: one strategy per target platform, registered with
//! [`Custom::export_to`]. Exporters that have no dedicated handler for a
//! custom segment ask it to export itself via [`Custom::export_as`].
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use uniseg_core::segment::Custom;
//!
//! let music = Custom::new("music", json!({"id": "28949129"}))
//!     .export_to("onebot", |seg| {
//!         let id = seg.content["id"].as_str()?;
//!         Some(onebot::Segment::music("163", id))
//!     });
//! ```

use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::Backref;
use crate::native::MessageSegment;

/// Type-erased export strategy stored on a [`Custom`] segment.
pub type CustomExportFn = dyn Fn(&Custom) -> Option<Box<dyn Any + Send>> + Send + Sync;

/// A segment type defined outside this crate.
#[derive(Clone, Serialize)]
pub struct Custom {
    /// Classification tag reported instead of `custom`.
    pub mstype: String,
    pub content: Value,
    #[serde(skip)]
    exporters: IndexMap<String, Arc<CustomExportFn>>,
    #[serde(skip)]
    pub(crate) origin: Backref,
}

impl Custom {
    pub fn new(mstype: impl Into<String>, content: Value) -> Self {
        Self {
            mstype: mstype.into(),
            content,
            exporters: IndexMap::new(),
            origin: Backref::default(),
        }
    }

    /// Registers how this segment exports to `adapter`.
    ///
    /// The strategy returns `None` when this particular value cannot be
    /// represented; the exporter then falls back as for any unsupported
    /// segment.
    pub fn export_to<S, F>(mut self, adapter: impl Into<String>, strategy: F) -> Self
    where
        S: MessageSegment,
        F: Fn(&Custom) -> Option<S> + Send + Sync + 'static,
    {
        let erased: Arc<CustomExportFn> = Arc::new(move |seg: &Custom| {
            strategy(seg).map(|native| Box::new(native) as Box<dyn Any + Send>)
        });
        self.exporters.insert(adapter.into(), erased);
        self
    }

    /// Returns true if a strategy is registered for `adapter`.
    pub fn supports(&self, adapter: &str) -> bool {
        self.exporters.contains_key(adapter)
    }

    /// Exports this segment as `adapter`'s native segment type `S`.
    ///
    /// `None` if no strategy is registered for `adapter`, the strategy
    /// declines, or it produces a different segment type.
    pub fn export_as<S: Any>(&self, adapter: &str) -> Option<S> {
        let strategy = self.exporters.get(adapter)?;
        strategy(self)?.downcast::<S>().ok().map(|native| *native)
    }
}

impl Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("mstype", &self.mstype)
            .field("content", &self.content)
            .field("exporters", &self.exporters.keys().collect::<Vec<_>>())
            .field("origin", &self.origin)
            .finish()
    }
}

impl PartialEq for Custom {
    fn eq(&self, other: &Self) -> bool {
        self.mstype == other.mstype && self.content == other.content
    }
}

//! Platform adapter plumbing.
//!
//! A platform plugs into the canonical layer by installing its builder as
//! patterns and its exporter into the registries it is handed.

use crate::export::{ExporterRegistry, MessageExporter};
use crate::pattern::{MessageBuilder, PatternRegistry};

/// One platform's contribution to the canonical layer.
///
/// # Example
///
/// ```rust,ignore
/// struct OneBotAdapter;
///
/// impl UniAdapter for OneBotAdapter {
///     type Builder = OneBotMessageBuilder;
///     type Exporter = OneBotMessageExporter;
///
///     fn name(&self) -> &'static str { "onebot" }
///     fn builder(&self) -> Self::Builder { OneBotMessageBuilder }
///     fn exporter(&self) -> Self::Exporter { OneBotMessageExporter }
/// }
/// ```
pub trait UniAdapter: Send + Sync + 'static {
    type Builder: MessageBuilder;
    type Exporter: MessageExporter;

    /// The platform identifier, shared by builder and exporter.
    fn name(&self) -> &'static str;

    fn builder(&self) -> Self::Builder;

    fn exporter(&self) -> Self::Exporter;

    /// Registers the builder's patterns and the exporter.
    fn install(&self, patterns: &mut PatternRegistry, exporters: &mut ExporterRegistry) {
        patterns.register_builder(self.builder());
        exporters.register(self.exporter());
    }
}

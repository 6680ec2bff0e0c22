//! The runtime: installed platforms plus the configuration they run under.
//!
//! [`UnisegRuntime`] owns one [`PatternRegistry`] and one
//! [`ExporterRegistry`]. Adapters, custom recognizers and extra patterns
//! are added through [`RuntimeBuilder`]; once built the registries are
//! read-only, so a runtime can be shared freely across tasks.
//!
//! # Example
//!
//! ```rust,ignore
//! use uniseg_runtime::{ConfigLoader, UnisegRuntime};
//!
//! let runtime = UnisegRuntime::builder(ConfigLoader::new().load()?)
//!     .adapter(OneBotAdapter::new())
//!     .adapter(SatoriAdapter::new())
//!     .build()?;
//!
//! let uni = runtime.recognize_message(&incoming);
//! let reply = runtime.export("satori", &uni).await?;
//! ```

use std::fmt::{self, Debug};

use tracing::{debug, info, instrument};
use uniseg_core::{
    Custom, ExporterRegistry, Message, MessageSegment, NativeMessage, Origin, PatternRegistry,
    Segment, UniAdapter, UniMessage, UniPattern,
};

use crate::config::{UnisegConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Recognition and export across every installed platform.
pub struct UnisegRuntime {
    config: UnisegConfig,
    patterns: PatternRegistry,
    exporters: ExporterRegistry,
}

impl UnisegRuntime {
    pub fn builder(config: UnisegConfig) -> RuntimeBuilder {
        RuntimeBuilder::new(config)
    }

    pub fn config(&self) -> &UnisegConfig {
        &self.config
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    pub fn exporters(&self) -> &ExporterRegistry {
        &self.exporters
    }

    /// Installed platform identifiers, in installation order.
    pub fn adapters(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.exporters.names()
    }

    /// Recognizes one native segment.
    pub fn recognize(&self, raw: &Origin) -> Segment {
        self.patterns.recognize(raw)
    }

    /// Recognizes every segment of a native message.
    pub fn recognize_message<S: MessageSegment>(&self, message: &Message<S>) -> UniMessage {
        self.patterns.recognize_message(message)
    }

    /// Exports to `adapter` using the configured fallback policy.
    pub async fn export(&self, adapter: &str, message: &UniMessage) -> RuntimeResult<NativeMessage> {
        self.export_with(adapter, message, self.config.export.fallback)
            .await
    }

    /// Exports to `adapter` with an explicit fallback policy.
    #[instrument(skip(self, message), fields(segments = message.len()))]
    pub async fn export_with(
        &self,
        adapter: &str,
        message: &UniMessage,
        fallback: bool,
    ) -> RuntimeResult<NativeMessage> {
        let exporter = self
            .exporters
            .get(adapter)
            .ok_or_else(|| RuntimeError::UnknownAdapter(adapter.to_string()))?;
        Ok(exporter.export_native(message, fallback).await?)
    }

    /// Exports to the configured default adapter.
    ///
    /// Without a configured default, a runtime with exactly one installed
    /// adapter uses that one.
    pub async fn export_default(&self, message: &UniMessage) -> RuntimeResult<NativeMessage> {
        let adapter = self.default_adapter()?;
        self.export(adapter, message).await
    }

    fn default_adapter(&self) -> RuntimeResult<&str> {
        if let Some(name) = self.config.export.default_adapter.as_deref() {
            return Ok(name);
        }
        let mut names = self.exporters.names();
        match (names.next(), names.next()) {
            (Some(only), None) => Ok(only),
            _ => Err(RuntimeError::NoDefaultAdapter),
        }
    }
}

impl Debug for UnisegRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnisegRuntime")
            .field("config", &self.config)
            .field("patterns", &self.patterns)
            .field("exporters", &self.exporters)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects adapters and recognizers for a [`UnisegRuntime`].
pub struct RuntimeBuilder {
    config: UnisegConfig,
    patterns: PatternRegistry,
    exporters: ExporterRegistry,
}

impl RuntimeBuilder {
    pub fn new(config: UnisegConfig) -> Self {
        Self {
            config,
            patterns: PatternRegistry::new(),
            exporters: ExporterRegistry::new(),
        }
    }

    /// Installs a platform's builder and exporter.
    pub fn adapter<A: UniAdapter>(mut self, adapter: A) -> Self {
        debug!(adapter = adapter.name(), "Installing adapter");
        adapter.install(&mut self.patterns, &mut self.exporters);
        self
    }

    /// Registers a custom recognizer tried after every builder pattern.
    pub fn custom_register<F>(
        mut self,
        condition: impl Into<uniseg_core::Condition>,
        builder: F,
    ) -> Self
    where
        F: Fn(&Origin) -> Option<Custom> + Send + Sync + 'static,
    {
        self.patterns.custom_mut().register(condition, builder);
        self
    }

    /// Registers an extra recognition pattern.
    pub fn pattern<P: UniPattern + 'static>(mut self, pattern: P) -> Self {
        self.patterns.register(pattern);
        self
    }

    /// Validates the configuration, initializes logging and freezes the
    /// registries.
    pub fn build(self) -> RuntimeResult<UnisegRuntime> {
        validate_config(&self.config)?;
        logging::init_from_config(&self.config.logging);

        if let Some(name) = &self.config.export.default_adapter
            && !self.exporters.contains(name)
        {
            return Err(RuntimeError::UnknownAdapter(name.clone()));
        }

        info!(
            adapters = ?self.exporters.names().collect::<Vec<_>>(),
            custom = self.patterns.custom().len(),
            "Runtime ready"
        );

        Ok(UnisegRuntime {
            config: self.config,
            patterns: self.patterns,
            exporters: self.exporters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use uniseg_adapter_onebot::{OneBotAdapter, OneBotMessage, parse_cq_string};
    use uniseg_adapter_satori::{SatoriAdapter, SatoriMessage};
    use uniseg_core::{At, FnPattern, SegmentKind, Text};

    use crate::config::ConfigError;

    fn with_both_adapters(config: UnisegConfig) -> UnisegRuntime {
        UnisegRuntime::builder(config)
            .adapter(OneBotAdapter::new())
            .adapter(SatoriAdapter::new())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_recognize_then_export_elsewhere() {
        let runtime = with_both_adapters(UnisegConfig::default());
        assert_eq!(runtime.adapters().collect::<Vec<_>>(), ["onebot", "satori"]);

        let native =
            OneBotMessage::from_segments(parse_cq_string("hi [CQ:at,qq=10001][CQ:poke,type=1,id=2]"));
        let uni = runtime.recognize_message(&native);
        assert_eq!(uni[2].kind(), SegmentKind::Other);

        let exported = runtime.export("satori", &uni).await.unwrap();
        let message = exported.downcast_ref::<SatoriMessage>().unwrap();
        assert_eq!(message.to_string(), r#"hi <at id="10001"/>[poke]"#);

        let strict = runtime.export_with("satori", &uni, false).await;
        assert!(matches!(strict, Err(RuntimeError::Serialize(_))));
    }

    #[tokio::test]
    async fn test_unknown_adapter() {
        let runtime = with_both_adapters(UnisegConfig::default());
        let result = runtime.export("telegram", &UniMessage::from("x")).await;
        assert!(matches!(result, Err(RuntimeError::UnknownAdapter(name)) if name == "telegram"));
    }

    #[tokio::test]
    async fn test_default_adapter_selection() {
        let message = UniMessage::from(Text::new("hi")) + At::user("1");

        let runtime = with_both_adapters(UnisegConfig::default());
        assert!(matches!(
            runtime.export_default(&message).await,
            Err(RuntimeError::NoDefaultAdapter)
        ));

        let mut config = UnisegConfig::default();
        config.export.default_adapter = Some("onebot".to_string());
        let exported = with_both_adapters(config).export_default(&message).await.unwrap();
        assert_eq!(exported.extract_plain_text(), "hi");
        assert!(exported.downcast_ref::<OneBotMessage>().is_some());

        let single = UnisegRuntime::builder(UnisegConfig::default())
            .adapter(SatoriAdapter::new())
            .build()
            .unwrap();
        let exported = single.export_default(&message).await.unwrap();
        assert!(exported.downcast_ref::<SatoriMessage>().is_some());
    }

    #[test]
    fn test_build_rejects_bad_config() {
        let mut config = UnisegConfig::default();
        config.export.default_adapter = Some("discord".to_string());
        let result = UnisegRuntime::builder(config)
            .adapter(OneBotAdapter::new())
            .build();
        assert!(matches!(result, Err(RuntimeError::UnknownAdapter(_))));

        let mut config = UnisegConfig::default();
        config.logging.level = "noisy".to_string();
        let result = UnisegRuntime::builder(config).build();
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::ValidationError { .. }))
        ));
    }

    #[test]
    fn test_custom_recognizer_precedes_other() {
        let runtime = UnisegRuntime::builder(UnisegConfig::default())
            .adapter(OneBotAdapter::new())
            .custom_register("poke", |origin| {
                Some(Custom::new("poke", Value::Object(origin.data())))
            })
            .build()
            .unwrap();

        let seg = runtime.recognize(&Origin::new(uniseg_adapter_onebot::Segment::poke("1", "2")));
        match seg {
            Segment::Custom(custom) => {
                assert_eq!(custom.mstype, "poke");
                assert_eq!(custom.content["id"], "2");
            }
            other => panic!("unexpected segment: {other:?}"),
        }
    }

    #[test]
    fn test_extra_pattern() {
        let runtime = UnisegRuntime::builder(UnisegConfig::default())
            .pattern(FnPattern::new(SegmentKind::Text, |origin: &Origin| {
                (origin.segment_type() == "poke").then(|| Text::new("*poke*").into())
            }))
            .build()
            .unwrap();

        let seg = runtime.recognize(&Origin::new(uniseg_adapter_onebot::Segment::poke("1", "2")));
        assert_eq!(seg.as_text().map(|text| text.text.as_str()), Some("*poke*"));
    }
}

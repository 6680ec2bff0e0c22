use uniseg_core::UniAdapter;

use crate::ADAPTER_NAME;
use crate::builder::SatoriMessageBuilder;
use crate::exporter::SatoriMessageExporter;
use crate::model::Element;
use crate::style::StyleRegistry;

/// The Satori platform.
///
/// Carries the style registry handed to every exporter it creates.
#[derive(Debug, Clone, Default)]
pub struct SatoriAdapter {
    styles: StyleRegistry,
}

impl SatoriAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the handler for a text style.
    pub fn with_style<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<Element>) -> Element + Send + Sync + 'static,
    {
        self.styles.register(name, handler);
        self
    }

    pub fn with_styles(mut self, styles: StyleRegistry) -> Self {
        self.styles = styles;
        self
    }
}

impl UniAdapter for SatoriAdapter {
    type Builder = SatoriMessageBuilder;
    type Exporter = SatoriMessageExporter;

    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn builder(&self) -> SatoriMessageBuilder {
        SatoriMessageBuilder
    }

    fn exporter(&self) -> SatoriMessageExporter {
        SatoriMessageExporter::with_styles(self.styles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SatoriMessage, StyleTag};
    use uniseg_core::MessageSegment as _;
    use uniseg_core::{ExporterRegistry, PatternRegistry, SegmentKind};

    #[tokio::test]
    async fn test_install_roundtrips_through_registries() {
        let adapter = SatoriAdapter::new().with_style("shout", |children| {
            Element::style(StyleTag::Bold, vec![Element::style(StyleTag::Underline, children)])
        });
        let mut patterns = PatternRegistry::new();
        let mut exporters = ExporterRegistry::new();
        adapter.install(&mut patterns, &mut exporters);

        let native = SatoriMessage::from_segments(vec![
            Element::text("hi "),
            Element::at("1", None),
            Element::author("2", "Bob"),
            Element::style(StyleTag::Italic, vec![Element::text("there")]),
        ]);
        let uni = patterns.recognize_message(&native);
        assert_eq!(uni[2].kind(), SegmentKind::Other);
        assert_eq!(uni[3].as_text().unwrap().render(), "<i>there</i>");

        let exported = exporters
            .get("satori")
            .unwrap()
            .export_native(&uni, false)
            .await
            .unwrap();
        let message = exported.downcast_ref::<SatoriMessage>().unwrap();
        assert_eq!(message, &native);
        assert_eq!(
            message.to_string(),
            r#"hi <at id="1"/><author id="2" name="Bob"/><i>there</i>"#
        );
    }

    #[tokio::test]
    async fn test_adapter_styles_reach_the_exporter() {
        use uniseg_core::{MessageExporter, Text};

        let adapter = SatoriAdapter::new().with_style("shout", |children| {
            Element::style(StyleTag::Bold, vec![Element::style(StyleTag::Underline, children)])
        });
        let text = Text::new("hey").marked(0, 3, ["shout"]);
        let elements = adapter.exporter().text(&text).await.unwrap();
        assert_eq!(elements[0].to_string(), "<b><u>hey</u></b>");
        assert!(SatoriMessageExporter::new().text(&text).await.is_err());
    }
}

use uniseg_core::UniAdapter;

use crate::ADAPTER_NAME;
use crate::builder::OneBotMessageBuilder;
use crate::exporter::OneBotMessageExporter;

/// The OneBot v11 platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneBotAdapter;

impl OneBotAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl UniAdapter for OneBotAdapter {
    type Builder = OneBotMessageBuilder;
    type Exporter = OneBotMessageExporter;

    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn builder(&self) -> OneBotMessageBuilder {
        OneBotMessageBuilder
    }

    fn exporter(&self) -> OneBotMessageExporter {
        OneBotMessageExporter
    }
}

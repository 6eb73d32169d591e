//! Extraction update builder.

use serde::Serialize;
use vpay_core::enums::ExtractionStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExtractionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExtractionUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.error_message.is_none()
            && self.raw_text.is_none()
            && self.description.is_none()
    }
}

#[derive(Default)]
pub struct ExtractionUpdateBuilder(ExtractionUpdate);

impl ExtractionUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(mut self, val: ExtractionStatus) -> Self {
        self.0.status = Some(val);
        self
    }

    #[must_use]
    pub fn error_message(mut self, val: Option<String>) -> Self {
        self.0.error_message = Some(val);
        self
    }

    #[must_use]
    pub fn raw_text(mut self, val: impl Into<String>) -> Self {
        self.0.raw_text = Some(val.into());
        self
    }

    #[must_use]
    pub fn description(mut self, val: impl Into<String>) -> Self {
        self.0.description = Some(val.into());
        self
    }

    #[must_use]
    pub fn build(self) -> ExtractionUpdate {
        self.0
    }
}

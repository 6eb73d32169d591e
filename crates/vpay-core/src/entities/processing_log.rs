use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::LogLevel;

/// Append-only operator trail of processing steps.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProcessingLog {
    pub id: String,
    pub component: String,
    pub message: String,
    pub level: LogLevel,
    pub details: serde_json::Value,
    pub trace_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

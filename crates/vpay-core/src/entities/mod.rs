//! Entity structs for all vpay domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema`; decimal columns are exposed
//! to JSON Schema as strings because `rust_decimal` serializes them that way.

mod control;
mod extraction;
mod processing_log;
mod reference;
mod validation;

pub use control::{ControlKey, ValidationControl};
pub use extraction::{Extraction, NewExtraction};
pub use processing_log::ProcessingLog;
pub use reference::{NewReferenceRecord, ReferenceRecord};
pub use validation::{FieldError, ValidationResult};

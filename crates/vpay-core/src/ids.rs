//! ID prefix constants.
//!
//! Every stored entity id has the form `<prefix>-<16 lowercase hex>`.

pub const PREFIX_EXTRACTION: &str = "ext";
pub const PREFIX_REFERENCE: &str = "ref";
pub const PREFIX_VALIDATION_RESULT: &str = "vrs";
pub const PREFIX_VALIDATION_CONTROL: &str = "vct";
pub const PREFIX_PROCESSING_LOG: &str = "log";
pub const PREFIX_TRACE: &str = "trc";

/// All prefixes, for tests that exercise id generation.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_EXTRACTION,
    PREFIX_REFERENCE,
    PREFIX_VALIDATION_RESULT,
    PREFIX_VALIDATION_CONTROL,
    PREFIX_PROCESSING_LOG,
    PREFIX_TRACE,
];

//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL.
//!
//! Validation results and control entries are immutable, so they have no builder.

pub mod extraction;
pub mod reference;

//! # vpay-core
//!
//! Core types, validators, and error types for vpay.
//!
//! This crate provides the foundational types shared across all vpay crates:
//! - Entity structs for extractions, reference records, validation results,
//!   validation control entries, and processing logs
//! - Lifecycle and outcome enums
//! - ID prefix constants
//! - Field validators for the extraction output contract
//! - Cross-cutting error types, codes, and severities

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod validators;

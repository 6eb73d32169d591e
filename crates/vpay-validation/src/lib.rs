//! # vpay-validation
//!
//! Decides whether an extracted payment claim can be approved.
//!
//! [`ValidationEngine`] applies the rules to one extraction and commits the
//! outcome through a [`ValidationStore`]; [`BatchRunner`] drives it over all
//! extractions waiting in status `extracted`.

pub mod batch;
pub mod engine;
pub mod error;
pub mod store;

pub use batch::{BatchFailure, BatchReport, BatchRunner};
pub use engine::ValidationEngine;
pub use error::ValidationError;
pub use store::ValidationStore;

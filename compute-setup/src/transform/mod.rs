//! Transformation module.
//!
//! - Builder: raw cluster description to provider document
//! - Pipeline: load, transform, validate and encode in one call

pub mod builder;
pub mod pipeline;

pub use builder::{transform, DEFAULT_SERVICE_ACCOUNT};
pub use pipeline::*;

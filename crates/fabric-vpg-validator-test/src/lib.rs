//! Test infrastructure for fabric-vpg-validator
//!
//! Provides:
//! - Annotation and VPG fixtures
//! - Config-store export generation for file-backed tests
//! - Scan result verification helpers

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;

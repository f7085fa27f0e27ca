//! Testing utilities and mock implementations
//!
//! Mocks for the text-generation provider, the analysis invoker, and the
//! ticket store, plus fixtures for common triage inputs.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

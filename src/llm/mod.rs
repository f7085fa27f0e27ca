//! Text-generation provider layer
//!
//! Provider-agnostic interface for the external text-generation service, with
//! OpenAI and Anthropic backends.

pub mod provider;
pub mod providers;

pub use provider::*;
pub use providers::*;

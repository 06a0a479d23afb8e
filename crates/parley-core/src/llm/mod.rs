//! LLM provider abstractions for Parley.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ProviderRegistry`: shared instances plus per-request construction

pub mod box_provider;
pub mod provider;
pub mod registry;

pub use box_provider::BoxLlmProvider;
pub use provider::LlmProvider;
pub use registry::{ProviderFactory, ProviderRegistry};

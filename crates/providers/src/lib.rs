//! LLM Provider implementations for ChefAI.
//!
//! All providers implement the `chefai_core::Provider` trait.
//! The router builds the chat and embedding providers from configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderSet, build_from_config};

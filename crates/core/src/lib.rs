//! # ChefAI Core
//!
//! Domain types, traits, and error definitions for the ChefAI recipe
//! assistant. This crate has **zero framework dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (language model, retrieval service, web
//! search, history store) is a trait here. Concrete clients live in their
//! own crates and are injected at startup, so they can be swapped via
//! configuration or replaced with stubs in tests.

pub mod dietary;
pub mod error;
pub mod event;
pub mod history;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod session;
pub mod tool;
pub mod web;

// Re-export key types at crate root for ergonomics
pub use dietary::{DietaryRestriction, DietaryRestrictionSet};
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use history::{HistoryRecord, HistoryStore, SavedRecipe, SavedRecipeStore};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retrieval::{RetrievalService, ScoredDocument};
pub use session::Session;
pub use tool::{Tool, ToolCall, ToolInput, ToolInvocation, ToolKind, ToolOutput, ToolRegistry};
pub use web::{WebSearchHit, WebSearchService};

//! Storage and retrieval backends for ChefAI.
//!
//! - History and saved recipes: in-memory or SQLite
//! - Recipe retrieval: Qdrant (REST) or an in-process vector index

pub mod in_memory;
pub mod qdrant;
pub mod vector;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::{InMemoryHistoryStore, InMemorySavedRecipeStore};
pub use qdrant::QdrantRetriever;
pub use vector::{InMemoryRetriever, cosine_similarity};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

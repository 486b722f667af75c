//! Persistence Adapters
//!
//! In-memory registries and storage for tests and development runs.

pub mod in_memory;

pub use in_memory::{InMemoryBoardProvider, InMemorySecurityRegistry, InMemoryStorage, StoredBatch};

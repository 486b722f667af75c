//! Infrastructure Layer
//!
//! Adapters implementing the application ports:
//!
//! - `persistence/`: in-memory security registry, board provider and storage
//! - `storage/`: JSON-lines file storage

pub mod persistence;
pub mod storage;

//! Storage Adapters
//!
//! File-backed message sinks.

pub mod jsonl;

pub use jsonl::JsonLinesStorage;

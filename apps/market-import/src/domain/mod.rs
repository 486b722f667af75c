//! Domain Layer
//!
//! Message shapes and the field mapping engine, free of I/O.
//!
//! - [`shared`]: security identifiers and domain enums
//! - [`messages`]: the closed set of messages a file row can become
//! - [`mapping`]: field descriptors, schemas and value coercion

pub mod mapping;
pub mod messages;
pub mod shared;

// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Market Import - field-mapping driven CSV market data importer
//!
//! Converts delimited text files describing market data into typed
//! messages and flushes them, ordered by server time, to per-security
//! storage.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: messages and the field mapping engine
//!   - `messages`: securities, boards, ticks, order log, transactions,
//!     candles, depth, level-1, positions, news
//!   - `mapping`: field descriptors, coercion, schemas and field sets
//!
//! - **Application**: orchestration
//!   - `ports`: `SecurityRegistryPort`, `BoardProviderPort`, `StoragePort`
//!   - `parser`: byte stream to lazy message sequence
//!   - `importer`: resolve, buffer and flush
//!
//! - **Infrastructure**: adapters
//!   - `persistence`: in-memory registries and storage
//!   - `storage`: JSON-lines files
//!
//! # Example
//!
//! ```rust,ignore
//! let mut fields = FieldSet::for_tag("ticks")?;
//! fields.configure(&settings)?;
//! let summary = importer.import(input, &mut fields, &mut |_| {}, &cancel)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Messages and field mapping, no I/O.
pub mod domain;

/// Application layer - Ports, parser and importer.
pub mod application;

/// Infrastructure layer - Port adapters.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Error types for the import pipeline.
pub mod error;

/// Logging setup.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::importer::{ImportSummary, Importer, ImporterSettings};
pub use application::parser::{CsvParser, ImportInput, ParserSettings};
pub use domain::mapping::{DataSchema, FieldDescriptor, FieldSet, FieldSettings, ReferenceZone};
pub use domain::messages::Message;
pub use domain::shared::SecurityId;
pub use error::{ConfigurationError, FieldConversionError, ImportError};
pub use infrastructure::persistence::{InMemoryBoardProvider, InMemorySecurityRegistry, InMemoryStorage};
pub use infrastructure::storage::JsonLinesStorage;

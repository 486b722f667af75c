//! Application Layer
//!
//! Orchestrates the domain mapping engine against external systems:
//!
//! - **Ports**: registry and storage interfaces
//! - **Parser**: byte stream to lazy message sequence
//! - **Importer**: resolve, buffer and flush messages to storage

pub mod importer;
pub mod parser;
pub mod ports;

pub use importer::{ImportSummary, Importer, ImporterSettings, SecurityListener};
pub use parser::{CsvParser, ImportInput, LineSeparator, ParserSettings};
pub use ports::*;

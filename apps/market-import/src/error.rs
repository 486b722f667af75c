//! Error types for the import pipeline.
//!
//! | Error | Raised | Effect |
//! |-------|--------|--------|
//! | [`ConfigurationError`] | field set / parser setup | fatal before any row is read |
//! | [`FieldConversionError`] | per cell | aborts the run |
//! | [`ImportError::SecurityIdentity`] | security rows in strict mode | aborts the run |
//! | [`ImportError::Storage`] | flush | propagated verbatim, not retried |
//!
//! Cancellation is not an error: the importer returns the counts
//! accumulated so far.

use thiserror::Error;

use crate::application::ports::{RegistryError, StorageError};

/// Setup-time errors (unknown schema tag, invalid descriptor settings).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The schema tag does not name a supported message shape.
    #[error("unknown schema tag '{0}'")]
    UnknownSchema(String),

    /// A field setting references a field the schema does not define.
    #[error("schema '{schema}' has no field named '{field}'")]
    UnknownField {
        /// Schema tag.
        schema: String,
        /// Requested field name.
        field: String,
    },

    /// An adapter field was configured without naming its adapter.
    #[error("field '{0}' is an adapter field and requires an adapter name")]
    MissingAdapter(String),

    /// A value mapping's domain value cannot be converted to the field type.
    #[error("invalid value mapping for field '{field}': '{value}' ({reason})")]
    InvalidValueMapping {
        /// Field name.
        field: String,
        /// Offending domain value.
        value: String,
        /// Conversion failure.
        reason: String,
    },

    /// A parser or importer setting is out of range.
    #[error("invalid setting '{name}' = '{value}': {reason}")]
    InvalidSetting {
        /// Setting name.
        name: String,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A cell could not be converted to its field's value type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {}: cannot convert '{value}' for field '{field}': {reason}", display_column(.column))]
pub struct FieldConversionError {
    /// 1-based line number in the input.
    pub line: u64,
    /// 0-based column index, if the field is bound to a column.
    pub column: Option<usize>,
    /// Display name of the field.
    pub field: String,
    /// Raw cell text.
    pub value: String,
    /// Conversion failure detail.
    pub reason: String,
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn display_column(column: &Option<usize>) -> String {
    column.map_or_else(|| "-".to_string(), |c| c.to_string())
}

/// Top-level error for a parse or import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Invalid setup detected before reading.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A cell failed conversion.
    #[error(transparent)]
    FieldConversion(#[from] FieldConversionError),

    /// A security row carries no usable identifier (strict mode only).
    #[error("line {line}: security row has no identifier ({security_id})")]
    SecurityIdentity {
        /// 1-based line number.
        line: u64,
        /// The incomplete identifier as read.
        security_id: String,
    },

    /// The input could not be tokenized.
    #[error("malformed input near line {line}: {message}")]
    Malformed {
        /// 1-based line number, 0 when unknown.
        line: u64,
        /// Tokenizer message.
        message: String,
    },

    /// Reading the input failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The security or board registry failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The storage collaborator rejected a batch.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<csv::Error> for ImportError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map_or(0, |p| p.line());
        match error.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            kind => Self::Malformed {
                line,
                message: format!("{kind:?}"),
            },
        }
    }
}

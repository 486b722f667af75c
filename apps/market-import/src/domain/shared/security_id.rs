//! Composite security identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Security identifier: instrument code plus the board (venue) it trades on.
///
/// Values are immutable in spirit: field setters return a modified copy so
/// descriptor closures follow a copy-mutate-reassign pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityId {
    /// Instrument code (e.g. "SBER", "AAPL").
    pub security_code: String,
    /// Board code (e.g. "TQBR", "NASDAQ").
    pub board_code: String,
}

impl SecurityId {
    /// Create a new identifier.
    #[must_use]
    pub fn new(security_code: impl Into<String>, board_code: impl Into<String>) -> Self {
        Self {
            security_code: security_code.into(),
            board_code: board_code.into(),
        }
    }

    /// Both parts are non-blank.
    #[must_use]
    pub fn is_identified(&self) -> bool {
        !self.security_code.trim().is_empty() && !self.board_code.trim().is_empty()
    }

    /// Copy with a different security code.
    #[must_use]
    pub fn with_security_code(&self, security_code: impl Into<String>) -> Self {
        Self {
            security_code: security_code.into(),
            board_code: self.board_code.clone(),
        }
    }

    /// Copy with a different board code.
    #[must_use]
    pub fn with_board_code(&self, board_code: impl Into<String>) -> Self {
        Self {
            security_code: self.security_code.clone(),
            board_code: board_code.into(),
        }
    }

    /// Case-insensitive key used by registries.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        format!(
            "{}@{}",
            self.security_code.trim().to_uppercase(),
            self.board_code.trim().to_uppercase()
        )
    }
}

impl fmt::Display for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.security_code, self.board_code)
    }
}

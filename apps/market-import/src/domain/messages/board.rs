//! Boards and their session states.

use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::shared::SessionState;

/// Board (trading venue section) definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    /// Board code.
    pub code: String,
    /// Exchange the board belongs to.
    pub exchange_code: Option<String>,
    /// Daily expiration time.
    pub expiry_time: Option<NaiveTime>,
    /// IANA time zone of the board.
    pub time_zone: Option<String>,
}

impl BoardRecord {
    /// Board with only a code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }
}

/// Session state change of a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    /// Board code.
    pub board_code: String,
    /// Time of the change.
    pub server_time: DateTime<FixedOffset>,
    /// New state.
    pub state: Option<SessionState>,
}

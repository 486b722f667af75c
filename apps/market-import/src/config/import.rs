//! Import run configuration.

use serde::{Deserialize, Serialize};

use crate::application::importer::DEFAULT_FLUSH_THRESHOLD;
use crate::domain::mapping::ReferenceZone;

/// What to import and how to tokenize it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Schema tag (`ticks`, `candles:60`, ...).
    pub schema: String,
    /// Column separator; `TAB` for tab.
    #[serde(default = "default_column_separator")]
    pub column_separator: String,
    /// Line separator: `CRLF`, `LF`, `CR` or one character.
    #[serde(default = "default_line_separator")]
    pub line_separator: String,
    /// Header lines to skip.
    #[serde(default)]
    pub skip_lines: usize,
    /// Zone for timestamps without an explicit offset.
    #[serde(default)]
    pub time_zone: ReferenceZone,
    /// Merge duplicate security rows onto stored records.
    #[serde(default = "default_true")]
    pub update_duplicate_securities: bool,
    /// Drop security rows without code or board instead of failing.
    #[serde(default = "default_true")]
    pub ignore_non_id_securities: bool,
    /// Buffered messages that trigger a flush.
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
}

fn default_column_separator() -> String {
    ",".to_string()
}

fn default_line_separator() -> String {
    "CRLF".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_flush_threshold() -> usize {
    DEFAULT_FLUSH_THRESHOLD
}

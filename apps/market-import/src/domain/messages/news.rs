//! News items.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::shared::NewsPriority;

/// News item, optionally tagged with an instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Source-assigned id.
    pub id: String,
    /// Related instrument code.
    pub security_code: Option<String>,
    /// Related board code.
    pub board_code: Option<String>,
    /// Publication time.
    pub server_time: DateTime<FixedOffset>,
    /// Headline.
    pub headline: Option<String>,
    /// Body text.
    pub story: Option<String>,
    /// Provider.
    pub source: Option<String>,
    /// Link.
    pub url: Option<String>,
    /// Priority.
    pub priority: Option<NewsPriority>,
    /// Language code.
    pub language: Option<String>,
}

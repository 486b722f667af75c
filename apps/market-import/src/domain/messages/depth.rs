//! Order book depth: single rows and merged snapshots.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{QuoteAction, QuoteCondition, SecurityId, Side};

/// One price level as read from a single depth row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLevel {
    /// Instrument.
    pub security_id: SecurityId,
    /// Book time.
    pub server_time: DateTime<FixedOffset>,
    /// Level price.
    pub price: Decimal,
    /// Level volume.
    pub volume: Decimal,
    /// Book side; required.
    pub side: Option<Side>,
    /// Orders at the level.
    pub orders_count: Option<i32>,
    /// Quote condition.
    pub condition: Option<QuoteCondition>,
    /// First position in an incremental update.
    pub start_position: Option<i32>,
    /// Last position in an incremental update.
    pub end_position: Option<i32>,
    /// Incremental action.
    pub action: Option<QuoteAction>,
}

/// A level inside a [`QuoteSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEntry {
    /// Level price.
    pub price: Decimal,
    /// Level volume.
    pub volume: Decimal,
    /// Orders at the level.
    pub orders_count: Option<i32>,
    /// Quote condition.
    pub condition: Option<QuoteCondition>,
    /// First position in an incremental update.
    pub start_position: Option<i32>,
    /// Last position in an incremental update.
    pub end_position: Option<i32>,
    /// Incremental action.
    pub action: Option<QuoteAction>,
}

/// Depth levels sharing one (time, security) key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Instrument.
    pub security_id: SecurityId,
    /// Book time.
    pub server_time: DateTime<FixedOffset>,
    /// Bid levels in input order.
    pub bids: Vec<QuoteEntry>,
    /// Ask levels in input order.
    pub asks: Vec<QuoteEntry>,
    /// Some level carried a start or end position.
    pub has_positions: bool,
}

impl QuoteSnapshot {
    /// Empty snapshot for a key.
    #[must_use]
    pub const fn new(security_id: SecurityId, server_time: DateTime<FixedOffset>) -> Self {
        Self {
            security_id,
            server_time,
            bids: Vec::new(),
            asks: Vec::new(),
            has_positions: false,
        }
    }

    /// Key equality: exact time and identifier.
    #[must_use]
    pub fn matches(&self, level: &QuoteLevel) -> bool {
        self.server_time == level.server_time && self.security_id == level.security_id
    }

    /// Append a level to its side.
    pub fn push(&mut self, level: QuoteLevel) {
        self.has_positions |= level.start_position.is_some() || level.end_position.is_some();
        let entry = QuoteEntry {
            price: level.price,
            volume: level.volume,
            orders_count: level.orders_count,
            condition: level.condition,
            start_position: level.start_position,
            end_position: level.end_position,
            action: level.action,
        };
        match level.side {
            Some(Side::Sell) => self.asks.push(entry),
            Some(Side::Buy) | None => self.bids.push(entry),
        }
    }
}

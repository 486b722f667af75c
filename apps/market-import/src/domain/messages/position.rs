//! Position change updates.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{SecurityId, Side};

/// A position change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum PositionChangeKind {
    BeginValue,
    CurrentValue,
    BlockedValue,
    CurrentPrice,
    AveragePrice,
    UnrealizedPnl,
    RealizedPnl,
    VariationMargin,
    Commission,
    Leverage,
    SettlementPrice,
    BuyOrdersMargin,
    SellOrdersMargin,
    OrdersMargin,
}

/// Configuration key and display name of every position change kind.
pub const POSITION_FIELDS: &[(PositionChangeKind, &str, &str)] = &[
    (PositionChangeKind::BeginValue, "begin_value", "Begin value"),
    (PositionChangeKind::CurrentValue, "current_value", "Current value"),
    (PositionChangeKind::BlockedValue, "blocked_value", "Blocked value"),
    (PositionChangeKind::CurrentPrice, "current_price", "Current price"),
    (PositionChangeKind::AveragePrice, "average_price", "Average price"),
    (PositionChangeKind::UnrealizedPnl, "unrealized_pnl", "Unrealized P&L"),
    (PositionChangeKind::RealizedPnl, "realized_pnl", "Realized P&L"),
    (PositionChangeKind::VariationMargin, "variation_margin", "Variation margin"),
    (PositionChangeKind::Commission, "commission", "Commission"),
    (PositionChangeKind::Leverage, "leverage", "Leverage"),
    (PositionChangeKind::SettlementPrice, "settlement_price", "Settlement price"),
    (PositionChangeKind::BuyOrdersMargin, "buy_orders_margin", "Buy orders margin"),
    (PositionChangeKind::SellOrdersMargin, "sell_orders_margin", "Sell orders margin"),
    (PositionChangeKind::OrdersMargin, "orders_margin", "Orders margin"),
];

/// Position changes for one instrument at one time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Instrument.
    pub security_id: SecurityId,
    /// Update time.
    pub server_time: DateTime<FixedOffset>,
    /// Strategy id.
    pub strategy_id: Option<String>,
    /// Position side.
    pub side: Option<Side>,
    /// Recorded changes.
    pub changes: BTreeMap<PositionChangeKind, Decimal>,
}

impl PositionUpdate {
    /// Record a change; zero values are never recorded.
    pub fn set_change(&mut self, kind: PositionChangeKind, value: Decimal) {
        if !value.is_zero() {
            self.changes.insert(kind, value);
        }
    }
}

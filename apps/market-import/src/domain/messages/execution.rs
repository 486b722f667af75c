//! Execution-kind messages: anonymous trades, order log, own transactions.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{
    CurrencyType, OrderState, OrderType, PositionEffect, SecurityId, Side, TimeInForce,
};

/// Anonymous trade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Instrument.
    pub security_id: SecurityId,
    /// Trade time.
    pub server_time: DateTime<FixedOffset>,
    /// Numeric trade id.
    pub trade_id: Option<i64>,
    /// String trade id.
    pub trade_string_id: Option<String>,
    /// Trade price.
    pub price: Decimal,
    /// Trade volume.
    pub volume: Decimal,
    /// Aggressor side.
    pub origin_side: Option<Side>,
    /// Open interest after the trade.
    pub open_interest: Option<Decimal>,
    /// System (non-market) trade.
    pub is_system: Option<bool>,
    /// Price moved up.
    pub is_up_tick: Option<bool>,
    /// Trade currency.
    pub currency: Option<CurrencyType>,
    /// Buy order id.
    pub order_buy_id: Option<i64>,
    /// Sell order id.
    pub order_sell_id: Option<i64>,
}

/// Order log entry (order book event, possibly with a trade).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLogEntry {
    /// Instrument.
    pub security_id: SecurityId,
    /// Event time.
    pub server_time: DateTime<FixedOffset>,
    /// Order id.
    pub order_id: Option<i64>,
    /// Order price.
    pub price: Decimal,
    /// Order volume.
    pub volume: Decimal,
    /// Order side.
    pub side: Option<Side>,
    /// System order.
    pub is_system: Option<bool>,
    /// Order state after the event.
    pub order_state: Option<OrderState>,
    /// Time in force.
    pub time_in_force: Option<TimeInForce>,
    /// Trade id when the event is a match.
    pub trade_id: Option<i64>,
    /// Trade price when the event is a match.
    pub trade_price: Option<Decimal>,
    /// Open interest.
    pub open_interest: Option<Decimal>,
    /// Carries order data.
    pub has_order_info: bool,
    /// Carries trade data.
    pub has_trade_info: bool,
}

impl OrderLogEntry {
    /// Derive the info flags from the populated fields.
    pub fn tag_kind(&mut self) {
        self.has_order_info = true;
        self.has_trade_info = self.trade_id.is_some() || self.trade_price.is_some();
    }
}

/// Own order or trade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Instrument.
    pub security_id: SecurityId,
    /// Event time.
    pub server_time: DateTime<FixedOffset>,
    /// Portfolio (account) name.
    pub portfolio_name: String,
    /// Client transaction id.
    pub transaction_id: Option<i64>,
    /// Exchange order id.
    pub order_id: Option<i64>,
    /// Order price.
    pub order_price: Decimal,
    /// Order volume.
    pub order_volume: Decimal,
    /// Unfilled balance.
    pub balance: Option<Decimal>,
    /// Side.
    pub side: Option<Side>,
    /// Order type.
    pub order_type: Option<OrderType>,
    /// Order state.
    pub order_state: Option<OrderState>,
    /// Time in force.
    pub time_in_force: Option<TimeInForce>,
    /// Trade id.
    pub trade_id: Option<i64>,
    /// Trade price.
    pub trade_price: Option<Decimal>,
    /// Trade volume.
    pub trade_volume: Option<Decimal>,
    /// User-assigned order id.
    pub user_order_id: Option<String>,
    /// Strategy id.
    pub strategy_id: Option<String>,
    /// Currency.
    pub currency: Option<CurrencyType>,
    /// Market maker order.
    pub is_market_maker: Option<bool>,
    /// Margin order.
    pub is_margin: Option<bool>,
    /// Manually placed order.
    pub is_manual: Option<bool>,
    /// Minimum fill volume.
    pub min_volume: Option<Decimal>,
    /// Open or close restriction.
    pub position_effect: Option<PositionEffect>,
    /// Post-only order.
    pub post_only: Option<bool>,
    /// Trade initiator.
    pub initiator: Option<bool>,
    /// Sequence number.
    pub seq_num: Option<i64>,
    /// Leverage.
    pub leverage: Option<i32>,
    /// Carries order data.
    pub has_order_info: bool,
    /// Carries trade data.
    pub has_trade_info: bool,
}

impl Transaction {
    /// Derive the info flags from the populated fields.
    pub fn tag_kind(&mut self) {
        self.has_order_info = true;
        self.has_trade_info =
            self.trade_id.is_some() || self.trade_price.is_some() || self.trade_volume.is_some();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_log_trade_flag_follows_trade_fields() {
        let mut entry = OrderLogEntry::default();
        entry.tag_kind();
        assert!(entry.has_order_info);
        assert!(!entry.has_trade_info);

        entry.trade_price = Some(Decimal::ONE);
        entry.tag_kind();
        assert!(entry.has_trade_info);
    }

    #[test]
    fn transaction_trade_flag_follows_trade_fields() {
        let mut transaction = Transaction {
            trade_volume: Some(Decimal::TEN),
            ..Transaction::default()
        };
        transaction.tag_kind();
        assert!(transaction.has_order_info);
        assert!(transaction.has_trade_info);
    }
}

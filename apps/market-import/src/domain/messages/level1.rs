//! Level-1 (top of book and statistics) updates.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{SecurityId, Side};

/// A level-1 change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Level1Field {
    OpenPrice,
    HighPrice,
    LowPrice,
    ClosePrice,
    LastTradePrice,
    LastTradeVolume,
    LastTradeId,
    LastTradeTime,
    LastTradeOrigin,
    BestBidPrice,
    BestBidVolume,
    BestBidTime,
    BestAskPrice,
    BestAskVolume,
    BestAskTime,
    BidsCount,
    BidsVolume,
    AsksCount,
    AsksVolume,
    Volume,
    Turnover,
    TradesCount,
    OpenInterest,
    AveragePrice,
    SettlementPrice,
    MinPrice,
    MaxPrice,
    PriceStep,
    StepPrice,
    MarginBuy,
    MarginSell,
    ImpliedVolatility,
    HistoricalVolatility,
    TheorPrice,
    Delta,
    Gamma,
    Vega,
    Theta,
    Rho,
    Vwap,
}

/// Value type of a level-1 change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level1Kind {
    /// Decimal quantity or price.
    Decimal,
    /// Count or id.
    Integer,
    /// Timestamp.
    Time,
    /// Side.
    Side,
}

/// Recorded value of a level-1 change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level1Value {
    /// Decimal value.
    Decimal(Decimal),
    /// Integer value.
    Integer(i64),
    /// Timestamp value.
    Time(DateTime<FixedOffset>),
    /// Side value.
    Side(Side),
}

/// Field name, display name and value type of one change kind.
#[derive(Debug, Clone, Copy)]
pub struct Level1FieldSpec {
    /// Change kind.
    pub field: Level1Field,
    /// Configuration key.
    pub key: &'static str,
    /// Display name.
    pub display_name: &'static str,
    /// Value type.
    pub kind: Level1Kind,
}

macro_rules! level1_fields {
    ($($field:ident => $key:literal, $display:literal, $kind:ident;)+) => {
        /// Every level-1 change kind in descriptor order.
        pub const LEVEL1_FIELDS: &[Level1FieldSpec] = &[
            $(Level1FieldSpec {
                field: Level1Field::$field,
                key: $key,
                display_name: $display,
                kind: Level1Kind::$kind,
            },)+
        ];
    };
}

level1_fields! {
    OpenPrice => "open_price", "Open price", Decimal;
    HighPrice => "high_price", "High price", Decimal;
    LowPrice => "low_price", "Low price", Decimal;
    ClosePrice => "close_price", "Close price", Decimal;
    LastTradePrice => "last_trade_price", "Last trade price", Decimal;
    LastTradeVolume => "last_trade_volume", "Last trade volume", Decimal;
    LastTradeId => "last_trade_id", "Last trade id", Integer;
    LastTradeTime => "last_trade_time", "Last trade time", Time;
    LastTradeOrigin => "last_trade_origin", "Last trade side", Side;
    BestBidPrice => "best_bid_price", "Best bid price", Decimal;
    BestBidVolume => "best_bid_volume", "Best bid volume", Decimal;
    BestBidTime => "best_bid_time", "Best bid time", Time;
    BestAskPrice => "best_ask_price", "Best ask price", Decimal;
    BestAskVolume => "best_ask_volume", "Best ask volume", Decimal;
    BestAskTime => "best_ask_time", "Best ask time", Time;
    BidsCount => "bids_count", "Bids count", Integer;
    BidsVolume => "bids_volume", "Bids volume", Decimal;
    AsksCount => "asks_count", "Asks count", Integer;
    AsksVolume => "asks_volume", "Asks volume", Decimal;
    Volume => "volume", "Volume", Decimal;
    Turnover => "turnover", "Turnover", Decimal;
    TradesCount => "trades_count", "Trades count", Integer;
    OpenInterest => "open_interest", "Open interest", Decimal;
    AveragePrice => "average_price", "Average price", Decimal;
    SettlementPrice => "settlement_price", "Settlement price", Decimal;
    MinPrice => "min_price", "Min price", Decimal;
    MaxPrice => "max_price", "Max price", Decimal;
    PriceStep => "price_step", "Price step", Decimal;
    StepPrice => "step_price", "Step price", Decimal;
    MarginBuy => "margin_buy", "Margin buy", Decimal;
    MarginSell => "margin_sell", "Margin sell", Decimal;
    ImpliedVolatility => "implied_volatility", "Implied volatility", Decimal;
    HistoricalVolatility => "historical_volatility", "Historical volatility", Decimal;
    TheorPrice => "theor_price", "Theoretical price", Decimal;
    Delta => "delta", "Delta", Decimal;
    Gamma => "gamma", "Gamma", Decimal;
    Vega => "vega", "Vega", Decimal;
    Theta => "theta", "Theta", Decimal;
    Rho => "rho", "Rho", Decimal;
    Vwap => "vwap", "VWAP", Decimal;
}

/// Level-1 changes for one instrument at one time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level1Update {
    /// Instrument.
    pub security_id: SecurityId,
    /// Update time.
    pub server_time: DateTime<FixedOffset>,
    /// Recorded changes.
    pub changes: BTreeMap<Level1Field, Level1Value>,
}

impl Level1Update {
    /// Record a decimal change; zero values are never recorded.
    pub fn set_decimal(&mut self, field: Level1Field, value: Decimal) {
        if !value.is_zero() {
            self.changes.insert(field, Level1Value::Decimal(value));
        }
    }

    /// Decimal change, if recorded.
    #[must_use]
    pub fn decimal(&self, field: Level1Field) -> Option<Decimal> {
        match self.changes.get(&field) {
            Some(Level1Value::Decimal(d)) => Some(*d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_decimal_changes_are_skipped() {
        let mut update = Level1Update::default();
        update.set_decimal(Level1Field::BestBidPrice, Decimal::ZERO);
        update.set_decimal(Level1Field::BestAskPrice, Decimal::new(1006, 1));

        assert_eq!(update.decimal(Level1Field::BestBidPrice), None);
        assert_eq!(update.decimal(Level1Field::BestAskPrice), Some(Decimal::new(1006, 1)));
    }

    #[test]
    fn keys_match_serialized_names() {
        for spec in LEVEL1_FIELDS {
            let json = serde_json::to_value(spec.field).unwrap();
            assert_eq!(json, spec.key);
        }
    }
}

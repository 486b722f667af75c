//! Shared Domain Types
//!
//! Value objects used by every message shape.

pub mod enums;
pub mod security_id;

pub use enums::{
    CandleState, CurrencyType, EnumKind, EnumValue, FieldEnum, NewsPriority, OptionType,
    OrderState, OrderType, PositionEffect, QuoteAction, QuoteCondition, SecurityType,
    SessionState, Side, TimeInForce,
};
pub use security_id::SecurityId;

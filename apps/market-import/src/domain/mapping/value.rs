//! Typed cell values.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Timelike};
use rust_decimal::Decimal;

use crate::domain::shared::{EnumKind, EnumValue};

/// Declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Fixed-point decimal.
    Decimal,
    /// Signed integer.
    Integer,
    /// Boolean.
    Bool,
    /// Free text.
    String,
    /// Point in time with offset.
    DateTime,
    /// Time of day or duration.
    TimeSpan,
    /// Member of a domain enum.
    Enum(EnumKind),
}

impl ValueType {
    /// Numeric types participate in zero-as-null handling.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Decimal | Self::Integer)
    }
}

/// A converted cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Decimal number.
    Decimal(Decimal),
    /// Integer.
    Integer(i64),
    /// Boolean.
    Bool(bool),
    /// Text.
    Text(String),
    /// Timestamp.
    DateTime(DateTime<FixedOffset>),
    /// Time of day or duration.
    TimeSpan(TimeDelta),
    /// Enum member.
    Enum(EnumValue),
}

impl FieldValue {
    /// Numeric zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Decimal(d) => d.is_zero(),
            Self::Integer(i) => *i == 0,
            _ => false,
        }
    }
}

/// A Rust type an apply closure can receive.
pub trait FieldType: Sized {
    /// Value type used to coerce cells for this Rust type.
    const VALUE_TYPE: ValueType;

    /// Extract the typed value, `None` when the variant does not match.
    fn from_value(value: FieldValue) -> Option<Self>;
}

impl FieldType for Decimal {
    const VALUE_TYPE: ValueType = ValueType::Decimal;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Decimal(d) => Some(d),
            FieldValue::Integer(i) => Some(Self::from(i)),
            _ => None,
        }
    }
}

impl FieldType for i64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl FieldType for i32 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(i) => Self::try_from(i).ok(),
            _ => None,
        }
    }
}

impl FieldType for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FieldType for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldType for DateTime<FixedOffset> {
    const VALUE_TYPE: ValueType = ValueType::DateTime;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl FieldType for TimeDelta {
    const VALUE_TYPE: ValueType = ValueType::TimeSpan;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::TimeSpan(td) => Some(td),
            _ => None,
        }
    }
}

impl FieldType for NaiveTime {
    const VALUE_TYPE: ValueType = ValueType::TimeSpan;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::TimeSpan(td) if td >= TimeDelta::zero() && td < TimeDelta::days(1) => {
                let secs = u32::try_from(td.num_seconds()).ok()?;
                Self::from_num_seconds_from_midnight_opt(secs, td.subsec_nanos().unsigned_abs())
            }
            _ => None,
        }
    }
}

/// Elapsed time since midnight.
#[must_use]
pub fn time_of_day(time: NaiveTime) -> TimeDelta {
    TimeDelta::seconds(i64::from(time.num_seconds_from_midnight()))
        + TimeDelta::nanoseconds(i64::from(time.nanosecond()))
}

//! Security definitions and vendor code mappings.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{CurrencyType, OptionType, SecurityId, SecurityType};

/// Security definition row. Everything except the identifier is optional so
/// partial rows can be merged onto an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRecord {
    /// Identifier.
    pub security_id: SecurityId,
    /// Full name.
    pub name: Option<String>,
    /// Short name.
    pub short_name: Option<String>,
    /// Minimum price increment.
    pub price_step: Option<Decimal>,
    /// Price decimals.
    pub decimals: Option<i32>,
    /// Minimum volume increment.
    pub volume_step: Option<Decimal>,
    /// Minimum order volume.
    pub min_volume: Option<Decimal>,
    /// Maximum order volume.
    pub max_volume: Option<Decimal>,
    /// Lot multiplier.
    pub multiplier: Option<Decimal>,
    /// Instrument class.
    pub security_type: Option<SecurityType>,
    /// Trading currency.
    pub currency: Option<CurrencyType>,
    /// Underlying instrument code.
    pub underlying_security_code: Option<String>,
    /// Underlying instrument class.
    pub underlying_security_type: Option<SecurityType>,
    /// Minimum volume of the underlying instrument.
    pub underlying_security_min_volume: Option<Decimal>,
    /// Option strike.
    pub strike: Option<Decimal>,
    /// Option right.
    pub option_type: Option<OptionType>,
    /// Binary option kind, free text.
    pub binary_option_type: Option<String>,
    /// Expiration.
    pub expiry_date: Option<DateTime<FixedOffset>>,
    /// Venue class.
    pub class: Option<String>,
    /// Issue size.
    pub issue_size: Option<Decimal>,
    /// Issue date.
    pub issue_date: Option<DateTime<FixedOffset>>,
    /// CFI classification code.
    pub cfi_code: Option<String>,
    /// Short selling allowed.
    pub shortable: Option<bool>,
    /// Basket (synthetic instrument) code.
    pub basket_code: Option<String>,
    /// Basket expression.
    pub basket_expression: Option<String>,
    /// Bond face value.
    pub face_value: Option<Decimal>,
}

macro_rules! merge_fields {
    ($target:ident, $source:ident; $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field.clone_from(&$source.$field);
            }
        )+
    };
}

impl SecurityRecord {
    /// A record carrying only its identifier.
    #[must_use]
    pub fn placeholder(security_id: SecurityId) -> Self {
        Self {
            security_id,
            ..Self::default()
        }
    }

    /// Overwrite fields that are set on `other`; unset fields keep their value.
    pub fn merge(&mut self, other: &Self) {
        merge_fields!(self, other;
            name,
            short_name,
            price_step,
            decimals,
            volume_step,
            min_volume,
            max_volume,
            multiplier,
            security_type,
            currency,
            underlying_security_code,
            underlying_security_type,
            underlying_security_min_volume,
            strike,
            option_type,
            binary_option_type,
            expiry_date,
            class,
            issue_size,
            issue_date,
            cfi_code,
            shortable,
            basket_code,
            basket_expression,
            face_value,
        );
    }
}

/// Link between a vendor's code for an instrument and the resolved identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIdMapping {
    /// Adapter (vendor) name.
    pub adapter: String,
    /// The vendor's identifier.
    pub adapter_id: SecurityId,
    /// Resolved internal identifier.
    pub security_id: SecurityId,
}

impl SecurityIdMapping {
    /// Empty mapping for one adapter.
    #[must_use]
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_unset_fields() {
        let mut existing = SecurityRecord {
            name: Some("Sberbank".to_string()),
            price_step: Some(Decimal::new(1, 2)),
            ..SecurityRecord::placeholder(SecurityId::new("SBER", "TQBR"))
        };
        let update = SecurityRecord {
            price_step: Some(Decimal::new(5, 2)),
            decimals: Some(2),
            ..SecurityRecord::placeholder(SecurityId::new("SBER", "TQBR"))
        };

        existing.merge(&update);

        assert_eq!(existing.name.as_deref(), Some("Sberbank"));
        assert_eq!(existing.price_step, Some(Decimal::new(5, 2)));
        assert_eq!(existing.decimals, Some(2));
    }
}

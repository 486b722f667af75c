//! Enumerated domain values that can be read from a file cell.
//!
//! Each enum lists its members with the label used for case-insensitive
//! name matching. Member order is the ordinal used when a cell holds a
//! number instead of a name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::mapping::{FieldType, FieldValue, ValueType};

/// An enum whose members can be resolved from text.
pub trait FieldEnum: Sized + Copy + PartialEq + 'static {
    /// Kind tag carried by [`FieldValue::Enum`].
    const KIND: EnumKind;
    /// Members in ordinal order with their labels.
    const MEMBERS: &'static [(&'static str, Self)];

    /// Resolve a member by label, ignoring ASCII case and surrounding space.
    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::MEMBERS
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(name))
            .map(|(_, member)| *member)
    }

    /// Label of this member.
    fn name(self) -> &'static str {
        Self::MEMBERS
            .iter()
            .find(|(_, member)| *member == self)
            .map_or("", |(label, _)| label)
    }
}

/// Resolved enum member carried between coercion and the apply closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Which enum the member belongs to.
    pub kind: EnumKind,
    /// Member label.
    pub name: &'static str,
}

macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl FieldEnum for $name {
            const KIND: EnumKind = EnumKind::$name;
            const MEMBERS: &'static [(&'static str, Self)] = &[ $( ($label, Self::$variant) ),+ ];
        }

        impl FieldType for $name {
            const VALUE_TYPE: ValueType = ValueType::Enum(EnumKind::$name);

            fn from_value(value: FieldValue) -> Option<Self> {
                match value {
                    FieldValue::Enum(member) if member.kind == Self::KIND => {
                        Self::from_name(member.name)
                    }
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

field_enum! {
    /// Order or trade direction.
    Side {
        /// Bid side.
        Buy => "Buy",
        /// Ask side.
        Sell => "Sell",
    }
}

field_enum! {
    /// Order lifecycle state.
    OrderState {
        /// Not yet acknowledged.
        Unregistered => "None",
        /// Sent, awaiting registration.
        Pending => "Pending",
        /// Rejected.
        Failed => "Failed",
        /// Live on the book.
        Active => "Active",
        /// Matched or cancelled.
        Done => "Done",
    }
}

field_enum! {
    /// Order type.
    OrderType {
        /// Limit order.
        Limit => "Limit",
        /// Market order.
        Market => "Market",
        /// Stop or other conditional order.
        Conditional => "Conditional",
        /// Repo order.
        Repo => "Repo",
        /// Extended repo order.
        ExtRepo => "ExtRepo",
        /// Negotiated deal order.
        Rps => "Rps",
        /// Execution order.
        Execute => "Execute",
    }
}

field_enum! {
    /// Order time in force.
    TimeInForce {
        /// Rest on the book.
        PutInQueue => "PutInQueue",
        /// Fill completely or cancel.
        MatchOrCancel => "MatchOrCancel",
        /// Fill what is possible, cancel the rest.
        CancelBalance => "CancelBalance",
    }
}

field_enum! {
    /// Instrument class.
    SecurityType {
        /// Equity.
        Stock => "Stock",
        /// Futures contract.
        Future => "Future",
        /// Option contract.
        Option => "Option",
        /// Index.
        Index => "Index",
        /// Currency pair.
        Currency => "Currency",
        /// Bond.
        Bond => "Bond",
        /// Warrant.
        Warrant => "Warrant",
        /// Forward contract.
        Forward => "Forward",
        /// Swap.
        Swap => "Swap",
        /// Commodity.
        Commodity => "Commodity",
        /// Contract for difference.
        Cfd => "Cfd",
        /// Exchange traded fund.
        Etf => "Etf",
        /// Crypto currency.
        CryptoCurrency => "CryptoCurrency",
        /// Mutual fund.
        Fund => "Fund",
    }
}

field_enum! {
    /// Settlement currency.
    CurrencyType {
        /// US dollar.
        Usd => "USD",
        /// Euro.
        Eur => "EUR",
        /// Russian rouble.
        Rub => "RUB",
        /// Pound sterling.
        Gbp => "GBP",
        /// Japanese yen.
        Jpy => "JPY",
        /// Chinese yuan.
        Cny => "CNY",
        /// Swiss franc.
        Chf => "CHF",
        /// Canadian dollar.
        Cad => "CAD",
        /// Australian dollar.
        Aud => "AUD",
        /// Hong Kong dollar.
        Hkd => "HKD",
        /// Bitcoin.
        Btc => "BTC",
        /// Tether.
        Usdt => "USDT",
    }
}

field_enum! {
    /// Option right.
    OptionType {
        /// Call option.
        Call => "Call",
        /// Put option.
        Put => "Put",
    }
}

field_enum! {
    /// Depth quote condition.
    QuoteCondition {
        /// Firm quote.
        Normal => "Normal",
        /// Indicative quote.
        Indicative => "Indicative",
    }
}

field_enum! {
    /// Incremental depth action.
    QuoteAction {
        /// New level.
        New => "New",
        /// Changed level.
        Update => "Update",
        /// Removed level.
        Delete => "Delete",
    }
}

field_enum! {
    /// News priority.
    NewsPriority {
        /// Low priority.
        Low => "Low",
        /// Normal priority.
        Regular => "Regular",
        /// High priority.
        High => "High",
    }
}

field_enum! {
    /// Trading session state of a board.
    SessionState {
        /// Session scheduled.
        Assigned => "Assigned",
        /// Trading.
        Started => "Started",
        /// Temporarily halted.
        Paused => "Paused",
        /// Halted by the venue.
        ForceStopped => "ForceStopped",
        /// Session closed.
        Ended => "Ended",
    }
}

field_enum! {
    /// Whether an order may open or only close a position.
    PositionEffect {
        /// Venue default.
        Default => "Default",
        /// Open only.
        OpenOnly => "OpenOnly",
        /// Close only.
        CloseOnly => "CloseOnly",
    }
}

/// Identifies which enum a [`FieldValue::Enum`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// [`Side`].
    Side,
    /// [`OrderState`].
    OrderState,
    /// [`OrderType`].
    OrderType,
    /// [`TimeInForce`].
    TimeInForce,
    /// [`SecurityType`].
    SecurityType,
    /// [`CurrencyType`].
    CurrencyType,
    /// [`OptionType`].
    OptionType,
    /// [`QuoteCondition`].
    QuoteCondition,
    /// [`QuoteAction`].
    QuoteAction,
    /// [`NewsPriority`].
    NewsPriority,
    /// [`SessionState`].
    SessionState,
    /// [`PositionEffect`].
    PositionEffect,
}

type NameLookup = fn(&str) -> Option<&'static str>;
type OrdinalLookup = fn(usize) -> Option<&'static str>;

fn name_in<E: FieldEnum>(raw: &str) -> Option<&'static str> {
    E::from_name(raw).map(FieldEnum::name)
}

fn ordinal_in<E: FieldEnum>(ordinal: usize) -> Option<&'static str> {
    E::MEMBERS.get(ordinal).map(|(label, _)| *label)
}

impl EnumKind {
    fn lookups(self) -> (NameLookup, OrdinalLookup) {
        match self {
            Self::Side => (name_in::<Side>, ordinal_in::<Side>),
            Self::OrderState => (name_in::<OrderState>, ordinal_in::<OrderState>),
            Self::OrderType => (name_in::<OrderType>, ordinal_in::<OrderType>),
            Self::TimeInForce => (name_in::<TimeInForce>, ordinal_in::<TimeInForce>),
            Self::SecurityType => (name_in::<SecurityType>, ordinal_in::<SecurityType>),
            Self::CurrencyType => (name_in::<CurrencyType>, ordinal_in::<CurrencyType>),
            Self::OptionType => (name_in::<OptionType>, ordinal_in::<OptionType>),
            Self::QuoteCondition => (name_in::<QuoteCondition>, ordinal_in::<QuoteCondition>),
            Self::QuoteAction => (name_in::<QuoteAction>, ordinal_in::<QuoteAction>),
            Self::NewsPriority => (name_in::<NewsPriority>, ordinal_in::<NewsPriority>),
            Self::SessionState => (name_in::<SessionState>, ordinal_in::<SessionState>),
            Self::PositionEffect => (name_in::<PositionEffect>, ordinal_in::<PositionEffect>),
        }
    }

    /// Resolve a member by label (case-insensitive).
    #[must_use]
    pub fn lookup(self, raw: &str) -> Option<EnumValue> {
        (self.lookups().0)(raw).map(|name| EnumValue { kind: self, name })
    }

    /// Resolve a member by ordinal.
    #[must_use]
    pub fn member_at(self, ordinal: usize) -> Option<EnumValue> {
        (self.lookups().1)(ordinal).map(|name| EnumValue { kind: self, name })
    }
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Candle lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleState {
    /// Still forming.
    #[default]
    Active,
    /// Closed.
    Finished,
}

//! Target messages produced from file rows.
//!
//! [`Message`] is a closed union over every shape a schema can emit. Field
//! descriptors bind to a concrete variant through [`RowTarget`].

mod board;
mod candle;
mod depth;
mod execution;
mod level1;
mod news;
mod position;
mod security;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::shared::SecurityId;

pub use board::{BoardRecord, BoardState};
pub use candle::Candle;
pub use depth::{QuoteEntry, QuoteLevel, QuoteSnapshot};
pub use execution::{OrderLogEntry, Tick, Transaction};
pub use level1::{LEVEL1_FIELDS, Level1Field, Level1FieldSpec, Level1Kind, Level1Update, Level1Value};
pub use news::NewsItem;
pub use position::{POSITION_FIELDS, PositionChangeKind, PositionUpdate};
pub use security::{SecurityIdMapping, SecurityRecord};

/// Timestamp used for messages whose time has not been read yet.
#[must_use]
pub fn blank_time() -> DateTime<FixedOffset> {
    DateTime::<FixedOffset>::default()
}

/// Any message the parser can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Security definition.
    Security(SecurityRecord),
    /// Vendor code to security link.
    SecurityMapping(SecurityIdMapping),
    /// Board definition.
    Board(BoardRecord),
    /// Board session state change.
    BoardState(BoardState),
    /// Anonymous trade.
    Tick(Tick),
    /// Order log entry.
    OrderLog(OrderLogEntry),
    /// Own order or trade.
    Transaction(Transaction),
    /// OHLC candle.
    Candle(Candle),
    /// Single depth level as read from one row.
    QuoteLevel(QuoteLevel),
    /// Depth levels merged from consecutive rows.
    QuoteSnapshot(QuoteSnapshot),
    /// Level-1 changes.
    Level1(Level1Update),
    /// Position changes.
    Position(PositionUpdate),
    /// News item.
    News(NewsItem),
}

impl Message {
    /// Short kind name for logs and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Security(_) => "security",
            Self::SecurityMapping(_) => "security_mapping",
            Self::Board(_) => "board",
            Self::BoardState(_) => "board_state",
            Self::Tick(_) => "tick",
            Self::OrderLog(_) => "order_log",
            Self::Transaction(_) => "transaction",
            Self::Candle(_) => "candle",
            Self::QuoteLevel(_) => "quote_level",
            Self::QuoteSnapshot(_) => "quote_snapshot",
            Self::Level1(_) => "level1",
            Self::Position(_) => "position",
            Self::News(_) => "news",
        }
    }

    /// Security the message belongs to. Boards, board states and news have none.
    #[must_use]
    pub const fn security_id(&self) -> Option<&SecurityId> {
        match self {
            Self::Security(m) => Some(&m.security_id),
            Self::SecurityMapping(m) => Some(&m.security_id),
            Self::Tick(m) => Some(&m.security_id),
            Self::OrderLog(m) => Some(&m.security_id),
            Self::Transaction(m) => Some(&m.security_id),
            Self::Candle(m) => Some(&m.security_id),
            Self::QuoteLevel(m) => Some(&m.security_id),
            Self::QuoteSnapshot(m) => Some(&m.security_id),
            Self::Level1(m) => Some(&m.security_id),
            Self::Position(m) => Some(&m.security_id),
            Self::Board(_) | Self::BoardState(_) | Self::News(_) => None,
        }
    }

    /// Replace the security identifier; no-op for messages without one.
    pub fn set_security_id(&mut self, id: SecurityId) {
        match self {
            Self::Security(m) => m.security_id = id,
            Self::SecurityMapping(m) => m.security_id = id,
            Self::Tick(m) => m.security_id = id,
            Self::OrderLog(m) => m.security_id = id,
            Self::Transaction(m) => m.security_id = id,
            Self::Candle(m) => m.security_id = id,
            Self::QuoteLevel(m) => m.security_id = id,
            Self::QuoteSnapshot(m) => m.security_id = id,
            Self::Level1(m) => m.security_id = id,
            Self::Position(m) => m.security_id = id,
            Self::Board(_) | Self::BoardState(_) | Self::News(_) => {}
        }
    }

    /// Time used to order buffered messages. Candles use their open time.
    #[must_use]
    pub const fn server_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::BoardState(m) => Some(m.server_time),
            Self::Tick(m) => Some(m.server_time),
            Self::OrderLog(m) => Some(m.server_time),
            Self::Transaction(m) => Some(m.server_time),
            Self::Candle(m) => Some(m.open_time),
            Self::QuoteLevel(m) => Some(m.server_time),
            Self::QuoteSnapshot(m) => Some(m.server_time),
            Self::Level1(m) => Some(m.server_time),
            Self::Position(m) => Some(m.server_time),
            Self::News(m) => Some(m.server_time),
            Self::Security(_) | Self::SecurityMapping(_) | Self::Board(_) => None,
        }
    }
}

/// A concrete message type a field descriptor can write to.
pub trait RowTarget: Sized + 'static {
    /// Borrow the concrete variant, `None` for other variants.
    fn from_message(message: &mut Message) -> Option<&mut Self>;
}

/// Message shapes carrying a [`SecurityId`].
pub trait HasSecurityId {
    /// Mutable access to the identifier.
    fn security_id_mut(&mut self) -> &mut SecurityId;
}

/// Message shapes carrying a server timestamp.
pub trait HasServerTime {
    /// Mutable access to the timestamp.
    fn server_time_mut(&mut self) -> &mut DateTime<FixedOffset>;
}

macro_rules! row_targets {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl RowTarget for $ty {
                fn from_message(message: &mut Message) -> Option<&mut Self> {
                    match message {
                        Message::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )+
    };
}

row_targets! {
    SecurityRecord => Security,
    SecurityIdMapping => SecurityMapping,
    BoardRecord => Board,
    BoardState => BoardState,
    Tick => Tick,
    OrderLogEntry => OrderLog,
    Transaction => Transaction,
    Candle => Candle,
    QuoteLevel => QuoteLevel,
    Level1Update => Level1,
    PositionUpdate => Position,
    NewsItem => News,
}

macro_rules! with_security_id {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HasSecurityId for $ty {
                fn security_id_mut(&mut self) -> &mut SecurityId {
                    &mut self.security_id
                }
            }
        )+
    };
}

with_security_id!(
    SecurityRecord,
    Tick,
    OrderLogEntry,
    Transaction,
    Candle,
    QuoteLevel,
    Level1Update,
    PositionUpdate,
);

macro_rules! with_server_time {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HasServerTime for $ty {
                fn server_time_mut(&mut self) -> &mut DateTime<FixedOffset> {
                    &mut self.server_time
                }
            }
        )+
    };
}

with_server_time!(
    BoardState,
    Tick,
    OrderLogEntry,
    Transaction,
    QuoteLevel,
    Level1Update,
    PositionUpdate,
    NewsItem,
);

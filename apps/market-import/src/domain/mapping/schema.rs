//! Schema tags: which message shape a file's rows become.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;

use crate::domain::messages::{
    BoardRecord, BoardState, Candle, Level1Update, Message, NewsItem, OrderLogEntry,
    PositionUpdate, QuoteLevel, SecurityRecord, Tick, Transaction,
};
use crate::error::ConfigurationError;

/// Target message shape of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSchema {
    /// Security definitions.
    Securities,
    /// Board definitions.
    Boards,
    /// Board session states.
    BoardStates,
    /// Anonymous trades.
    Ticks,
    /// Order log.
    OrderLog,
    /// Own orders and trades.
    Transactions,
    /// Candles with an optional fixed time frame.
    Candles {
        /// Time frame from the `candles:<seconds>` tag.
        time_frame: Option<TimeDelta>,
    },
    /// Order book depth rows.
    Depth,
    /// Level-1 updates.
    Level1,
    /// Position changes.
    Positions,
    /// News.
    News,
}

impl DataSchema {
    /// Fresh message for one row.
    #[must_use]
    pub fn blank_message(&self) -> Message {
        match self {
            Self::Securities => Message::Security(SecurityRecord::default()),
            Self::Boards => Message::Board(BoardRecord::default()),
            Self::BoardStates => Message::BoardState(BoardState::default()),
            Self::Ticks => Message::Tick(Tick::default()),
            Self::OrderLog => Message::OrderLog(OrderLogEntry::default()),
            Self::Transactions => Message::Transaction(Transaction::default()),
            Self::Candles { .. } => Message::Candle(Candle::default()),
            Self::Depth => Message::QuoteLevel(QuoteLevel::default()),
            Self::Level1 => Message::Level1(Level1Update::default()),
            Self::Positions => Message::Position(PositionUpdate::default()),
            Self::News => Message::News(NewsItem::default()),
        }
    }

    /// Complete a row's message once every field has been applied.
    ///
    /// Returns the name of a field whose value is mandatory but missing.
    pub fn finalize(&self, message: &mut Message) -> Result<(), &'static str> {
        match (self, message) {
            (Self::Candles { time_frame }, Message::Candle(candle)) => {
                candle.finish(*time_frame);
                Ok(())
            }
            (Self::OrderLog, Message::OrderLog(entry)) => {
                entry.tag_kind();
                Ok(())
            }
            (Self::Transactions, Message::Transaction(transaction)) => {
                transaction.tag_kind();
                Ok(())
            }
            (Self::Depth, Message::QuoteLevel(level)) if level.side.is_none() => Err("side"),
            _ => Ok(()),
        }
    }

    /// Canonical tag.
    #[must_use]
    pub fn tag(&self) -> String {
        match self {
            Self::Securities => "securities".to_string(),
            Self::Boards => "boards".to_string(),
            Self::BoardStates => "board_states".to_string(),
            Self::Ticks => "ticks".to_string(),
            Self::OrderLog => "order_log".to_string(),
            Self::Transactions => "transactions".to_string(),
            Self::Candles { time_frame: None } => "candles".to_string(),
            Self::Candles {
                time_frame: Some(tf),
            } => format!("candles:{}", tf.num_seconds()),
            Self::Depth => "depth".to_string(),
            Self::Level1 => "level1".to_string(),
            Self::Positions => "positions".to_string(),
            Self::News => "news".to_string(),
        }
    }
}

impl FromStr for DataSchema {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigurationError::UnknownSchema(s.to_string());
        let tag = s.trim().to_ascii_lowercase();
        let (base, arg) = match tag.split_once(':') {
            Some((base, arg)) => (base, Some(arg.trim())),
            None => (tag.as_str(), None),
        };

        let schema = match base {
            "securities" | "security" => Self::Securities,
            "boards" | "board" => Self::Boards,
            "board_states" | "board_state" => Self::BoardStates,
            "ticks" | "tick" | "trades" => Self::Ticks,
            "order_log" | "orderlog" => Self::OrderLog,
            "transactions" | "transaction" => Self::Transactions,
            "candles" | "candle" => {
                let time_frame = match arg {
                    None => None,
                    Some(secs) => {
                        let secs: i64 = secs.parse().map_err(|_| unknown())?;
                        if secs <= 0 {
                            return Err(unknown());
                        }
                        Some(TimeDelta::try_seconds(secs).ok_or_else(unknown)?)
                    }
                };
                return Ok(Self::Candles { time_frame });
            }
            "depth" | "market_depth" | "quotes" => Self::Depth,
            "level1" | "level_1" => Self::Level1,
            "positions" | "position" | "position_changes" => Self::Positions,
            "news" => Self::News,
            _ => return Err(unknown()),
        };

        if arg.is_some() {
            return Err(unknown());
        }
        Ok(schema)
    }
}

impl fmt::Display for DataSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::shared::CandleState;

    #[test_case("Level1", DataSchema::Level1)]
    #[test_case("trades", DataSchema::Ticks)]
    #[test_case(" OrderLog ", DataSchema::OrderLog)]
    #[test_case("market_depth", DataSchema::Depth)]
    #[test_case("position_changes", DataSchema::Positions)]
    #[test_case("candles", DataSchema::Candles { time_frame: None })]
    #[test_case("candles:60", DataSchema::Candles { time_frame: Some(TimeDelta::minutes(1)) })]
    fn parses_tags(tag: &str, expected: DataSchema) {
        assert_eq!(tag.parse::<DataSchema>().unwrap(), expected);
    }

    #[test_case("bogus")]
    #[test_case("candles:-5")]
    #[test_case("candles:abc")]
    #[test_case("ticks:5")]
    fn rejects_unknown_tags(tag: &str) {
        let Err(err) = tag.parse::<DataSchema>() else {
            panic!("'{tag}' should be rejected");
        };
        assert_eq!(err, ConfigurationError::UnknownSchema(tag.to_string()));
    }

    #[test]
    fn tag_round_trips() {
        let schema = DataSchema::Candles {
            time_frame: Some(TimeDelta::minutes(5)),
        };
        assert_eq!(schema.tag(), "candles:300");
        assert_eq!(schema.tag().parse::<DataSchema>().unwrap(), schema);
    }

    #[test]
    fn finalize_marks_candles_finished() {
        let schema = DataSchema::Candles {
            time_frame: Some(TimeDelta::minutes(1)),
        };
        let mut message = schema.blank_message();
        schema.finalize(&mut message).unwrap();
        let Message::Candle(candle) = message else {
            panic!("candle schema builds candles");
        };
        assert_eq!(candle.state, CandleState::Finished);
        assert_eq!(candle.time_frame_secs, Some(60));
    }

    #[test]
    fn finalize_requires_depth_side() {
        let mut message = DataSchema::Depth.blank_message();
        assert_eq!(DataSchema::Depth.finalize(&mut message), Err("side"));
    }
}

//! Canonical descriptor lists per schema.
//!
//! Apply closures are bound here, once per schema, to the concrete message
//! type they write. Order matters: `date` precedes `time` so the time of day
//! is added onto the parsed date.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta};
use rust_decimal::Decimal;

use super::descriptor::FieldDescriptor;
use super::schema::DataSchema;
use super::value::time_of_day;
use crate::domain::messages::{
    BoardRecord, BoardState, Candle, HasSecurityId, HasServerTime, LEVEL1_FIELDS, Level1Kind,
    Level1Update, Level1Value, NewsItem, OrderLogEntry, POSITION_FIELDS, PositionUpdate,
    QuoteLevel, RowTarget, SecurityIdMapping, SecurityRecord, Tick, Transaction,
};
use crate::domain::shared::{
    CurrencyType, NewsPriority, OptionType, OrderState, OrderType, PositionEffect, QuoteAction,
    QuoteCondition, SecurityType, SessionState, Side, TimeInForce,
};

/// Build the ordered descriptor list for a schema.
#[must_use]
pub fn descriptors(schema: DataSchema) -> Vec<FieldDescriptor> {
    match schema {
        DataSchema::Securities => security_fields(),
        DataSchema::Boards => board_fields(),
        DataSchema::BoardStates => board_state_fields(),
        DataSchema::Ticks => tick_fields(),
        DataSchema::OrderLog => order_log_fields(),
        DataSchema::Transactions => transaction_fields(),
        DataSchema::Candles { .. } => candle_fields(),
        DataSchema::Depth => depth_fields(),
        DataSchema::Level1 => level1_fields(),
        DataSchema::Positions => position_fields(),
        DataSchema::News => news_fields(),
    }
}

/// Replace the date part of `current`, keeping its time of day.
fn with_date(current: DateTime<FixedOffset>, date: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    date.checked_add_signed(time_of_day(current.time()))
        .unwrap_or(date)
}

fn add_span(current: DateTime<FixedOffset>, span: TimeDelta) -> DateTime<FixedOffset> {
    current.checked_add_signed(span).unwrap_or(current)
}

fn start_of_day(time: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    time.checked_sub_signed(time_of_day(time.time()))
        .unwrap_or(time)
}

fn adapter_fields() -> [FieldDescriptor; 2] {
    [
        FieldDescriptor::new(
            "adapter.security_code",
            "Adapter security code",
            |m: &mut SecurityIdMapping, v: String| {
                m.adapter_id = m.adapter_id.with_security_code(v);
            },
        )
        .adapter_field()
        .describe("Instrument code used by an external adapter"),
        FieldDescriptor::new(
            "adapter.board_code",
            "Adapter board code",
            |m: &mut SecurityIdMapping, v: String| {
                m.adapter_id = m.adapter_id.with_board_code(v);
            },
        )
        .adapter_field()
        .describe("Board code used by an external adapter; defaults to the row's board"),
    ]
}

fn id_fields<T: RowTarget + HasSecurityId>() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("security_code", "Security code", |t: &mut T, v: String| {
            let id = t.security_id_mut();
            *id = id.with_security_code(v);
        })
        .required(),
        FieldDescriptor::new("board_code", "Board code", |t: &mut T, v: String| {
            let id = t.security_id_mut();
            *id = id.with_board_code(v);
        })
        .required(),
    ]
}

fn time_fields<T: RowTarget + HasServerTime>() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("date", "Date", |t: &mut T, v: DateTime<FixedOffset>| {
            let time = t.server_time_mut();
            *time = with_date(*time, v);
        })
        .required(),
        FieldDescriptor::new("time", "Time", |t: &mut T, v: TimeDelta| {
            let time = t.server_time_mut();
            *time = add_span(*time, v);
        }),
    ]
}

fn security_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<SecurityRecord>();
    fields.extend(adapter_fields());
    fields.extend([
        FieldDescriptor::new("name", "Name", |s: &mut SecurityRecord, v: String| {
            s.name = Some(v);
        }),
        FieldDescriptor::new("short_name", "Short name", |s: &mut SecurityRecord, v: String| {
            s.short_name = Some(v);
        }),
        FieldDescriptor::new("price_step", "Price step", |s: &mut SecurityRecord, v: Decimal| {
            s.price_step = Some(v);
        }),
        FieldDescriptor::new("decimals", "Decimals", |s: &mut SecurityRecord, v: i32| {
            s.decimals = Some(v);
        }),
        FieldDescriptor::new("volume_step", "Volume step", |s: &mut SecurityRecord, v: Decimal| {
            s.volume_step = Some(v);
        }),
        FieldDescriptor::new("min_volume", "Min volume", |s: &mut SecurityRecord, v: Decimal| {
            s.min_volume = Some(v);
        }),
        FieldDescriptor::new("max_volume", "Max volume", |s: &mut SecurityRecord, v: Decimal| {
            s.max_volume = Some(v);
        }),
        FieldDescriptor::new("multiplier", "Lot", |s: &mut SecurityRecord, v: Decimal| {
            s.multiplier = Some(v);
        }),
        FieldDescriptor::new(
            "security_type",
            "Type",
            |s: &mut SecurityRecord, v: SecurityType| s.security_type = Some(v),
        ),
        FieldDescriptor::new("currency", "Currency", |s: &mut SecurityRecord, v: CurrencyType| {
            s.currency = Some(v);
        }),
        FieldDescriptor::new(
            "underlying_security_code",
            "Underlying",
            |s: &mut SecurityRecord, v: String| s.underlying_security_code = Some(v),
        ),
        FieldDescriptor::new(
            "underlying_security_type",
            "Underlying type",
            |s: &mut SecurityRecord, v: SecurityType| s.underlying_security_type = Some(v),
        ),
        FieldDescriptor::new(
            "underlying_security_min_volume",
            "Underlying min volume",
            |s: &mut SecurityRecord, v: Decimal| s.underlying_security_min_volume = Some(v),
        ),
        FieldDescriptor::new("strike", "Strike", |s: &mut SecurityRecord, v: Decimal| {
            s.strike = Some(v);
        }),
        FieldDescriptor::new("option_type", "Option type", |s: &mut SecurityRecord, v: OptionType| {
            s.option_type = Some(v);
        }),
        FieldDescriptor::new(
            "binary_option_type",
            "Binary option",
            |s: &mut SecurityRecord, v: String| s.binary_option_type = Some(v),
        ),
        FieldDescriptor::new(
            "expiry_date",
            "Expiry date",
            |s: &mut SecurityRecord, v: DateTime<FixedOffset>| s.expiry_date = Some(v),
        ),
        FieldDescriptor::new("class", "Class", |s: &mut SecurityRecord, v: String| {
            s.class = Some(v);
        }),
        FieldDescriptor::new("issue_size", "Issue size", |s: &mut SecurityRecord, v: Decimal| {
            s.issue_size = Some(v);
        }),
        FieldDescriptor::new(
            "issue_date",
            "Issue date",
            |s: &mut SecurityRecord, v: DateTime<FixedOffset>| s.issue_date = Some(v),
        ),
        FieldDescriptor::new("cfi_code", "CFI code", |s: &mut SecurityRecord, v: String| {
            s.cfi_code = Some(v);
        }),
        FieldDescriptor::new("shortable", "Shortable", |s: &mut SecurityRecord, v: bool| {
            s.shortable = Some(v);
        }),
        FieldDescriptor::new("basket_code", "Basket code", |s: &mut SecurityRecord, v: String| {
            s.basket_code = Some(v);
        }),
        FieldDescriptor::new(
            "basket_expression",
            "Basket expression",
            |s: &mut SecurityRecord, v: String| s.basket_expression = Some(v),
        ),
        FieldDescriptor::new("face_value", "Face value", |s: &mut SecurityRecord, v: Decimal| {
            s.face_value = Some(v);
        }),
    ]);
    fields
}

fn board_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("board_code", "Board code", |b: &mut BoardRecord, v: String| {
            b.code = v;
        })
        .required(),
        FieldDescriptor::new("exchange_code", "Exchange", |b: &mut BoardRecord, v: String| {
            b.exchange_code = Some(v);
        }),
        FieldDescriptor::new("expiry_time", "Expiry time", |b: &mut BoardRecord, v: NaiveTime| {
            b.expiry_time = Some(v);
        }),
        FieldDescriptor::new("time_zone", "Time zone", |b: &mut BoardRecord, v: String| {
            b.time_zone = Some(v);
        }),
    ]
}

fn board_state_fields() -> Vec<FieldDescriptor> {
    let mut fields = vec![
        FieldDescriptor::new("board_code", "Board code", |b: &mut BoardState, v: String| {
            b.board_code = v;
        })
        .required(),
    ];
    fields.extend(time_fields::<BoardState>());
    fields.push(
        FieldDescriptor::new("state", "State", |b: &mut BoardState, v: SessionState| {
            b.state = Some(v);
        })
        .required(),
    );
    fields
}

fn tick_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<Tick>();
    fields.extend([
        FieldDescriptor::new("trade_id", "Trade id", |t: &mut Tick, v: i64| t.trade_id = Some(v)),
        FieldDescriptor::new("trade_string_id", "Trade id (string)", |t: &mut Tick, v: String| {
            t.trade_string_id = Some(v);
        }),
    ]);
    fields.extend(time_fields::<Tick>());
    fields.extend([
        FieldDescriptor::new("trade_price", "Price", |t: &mut Tick, v: Decimal| t.price = v)
            .required(),
        FieldDescriptor::new("trade_volume", "Volume", |t: &mut Tick, v: Decimal| t.volume = v)
            .required(),
        FieldDescriptor::new("origin_side", "Initiator", |t: &mut Tick, v: Side| {
            t.origin_side = Some(v);
        }),
        FieldDescriptor::new("open_interest", "Open interest", |t: &mut Tick, v: Decimal| {
            t.open_interest = Some(v);
        }),
        FieldDescriptor::new("is_system", "System", |t: &mut Tick, v: bool| t.is_system = Some(v)),
        FieldDescriptor::new("is_up_tick", "Up tick", |t: &mut Tick, v: bool| {
            t.is_up_tick = Some(v);
        }),
        FieldDescriptor::new("currency", "Currency", |t: &mut Tick, v: CurrencyType| {
            t.currency = Some(v);
        }),
        FieldDescriptor::new("order_buy_id", "Buy order id", |t: &mut Tick, v: i64| {
            t.order_buy_id = Some(v);
        }),
        FieldDescriptor::new("order_sell_id", "Sell order id", |t: &mut Tick, v: i64| {
            t.order_sell_id = Some(v);
        }),
    ]);
    fields
}

fn order_log_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<OrderLogEntry>();
    fields.push(
        FieldDescriptor::new("order_id", "Order id", |o: &mut OrderLogEntry, v: i64| {
            o.order_id = Some(v);
        })
        .required(),
    );
    fields.extend(time_fields::<OrderLogEntry>());
    fields.extend([
        FieldDescriptor::new("order_price", "Price", |o: &mut OrderLogEntry, v: Decimal| {
            o.price = v;
        })
        .required(),
        FieldDescriptor::new("order_volume", "Volume", |o: &mut OrderLogEntry, v: Decimal| {
            o.volume = v;
        })
        .required(),
        FieldDescriptor::new("side", "Side", |o: &mut OrderLogEntry, v: Side| o.side = Some(v))
            .required(),
        FieldDescriptor::new("is_system", "System", |o: &mut OrderLogEntry, v: bool| {
            o.is_system = Some(v);
        }),
        FieldDescriptor::new("order_state", "State", |o: &mut OrderLogEntry, v: OrderState| {
            o.order_state = Some(v);
        })
        .required(),
        FieldDescriptor::new(
            "time_in_force",
            "Time in force",
            |o: &mut OrderLogEntry, v: TimeInForce| o.time_in_force = Some(v),
        ),
        FieldDescriptor::new("trade_id", "Trade id", |o: &mut OrderLogEntry, v: i64| {
            o.trade_id = Some(v);
        })
        .required(),
        FieldDescriptor::new("trade_price", "Trade price", |o: &mut OrderLogEntry, v: Decimal| {
            o.trade_price = Some(v);
        })
        .required(),
        FieldDescriptor::new(
            "open_interest",
            "Open interest",
            |o: &mut OrderLogEntry, v: Decimal| o.open_interest = Some(v),
        ),
    ]);
    fields
}

fn transaction_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<Transaction>();
    fields.extend(time_fields::<Transaction>());
    fields.extend([
        FieldDescriptor::new("portfolio_name", "Portfolio", |t: &mut Transaction, v: String| {
            t.portfolio_name = v;
        })
        .required(),
        FieldDescriptor::new("transaction_id", "Transaction id", |t: &mut Transaction, v: i64| {
            t.transaction_id = Some(v);
        }),
        FieldDescriptor::new("order_id", "Order id", |t: &mut Transaction, v: i64| {
            t.order_id = Some(v);
        }),
        FieldDescriptor::new("order_price", "Price", |t: &mut Transaction, v: Decimal| {
            t.order_price = v;
        })
        .required(),
        FieldDescriptor::new("order_volume", "Volume", |t: &mut Transaction, v: Decimal| {
            t.order_volume = v;
        })
        .required(),
        FieldDescriptor::new("balance", "Balance", |t: &mut Transaction, v: Decimal| {
            t.balance = Some(v);
        })
        .required(),
        FieldDescriptor::new("side", "Side", |t: &mut Transaction, v: Side| t.side = Some(v)),
        FieldDescriptor::new("order_type", "Order type", |t: &mut Transaction, v: OrderType| {
            t.order_type = Some(v);
        })
        .required(),
        FieldDescriptor::new("order_state", "State", |t: &mut Transaction, v: OrderState| {
            t.order_state = Some(v);
        })
        .required(),
        FieldDescriptor::new(
            "time_in_force",
            "Time in force",
            |t: &mut Transaction, v: TimeInForce| t.time_in_force = Some(v),
        ),
        FieldDescriptor::new("trade_id", "Trade id", |t: &mut Transaction, v: i64| {
            t.trade_id = Some(v);
        })
        .required(),
        FieldDescriptor::new("trade_price", "Trade price", |t: &mut Transaction, v: Decimal| {
            t.trade_price = Some(v);
        })
        .required(),
        FieldDescriptor::new("trade_volume", "Trade volume", |t: &mut Transaction, v: Decimal| {
            t.trade_volume = Some(v);
        }),
        FieldDescriptor::new("user_order_id", "User order id", |t: &mut Transaction, v: String| {
            t.user_order_id = Some(v);
        }),
        FieldDescriptor::new("strategy_id", "Strategy", |t: &mut Transaction, v: String| {
            t.strategy_id = Some(v);
        }),
        FieldDescriptor::new("currency", "Currency", |t: &mut Transaction, v: CurrencyType| {
            t.currency = Some(v);
        }),
        FieldDescriptor::new("is_market_maker", "Market maker", |t: &mut Transaction, v: bool| {
            t.is_market_maker = Some(v);
        }),
        FieldDescriptor::new("is_margin", "Margin", |t: &mut Transaction, v: bool| {
            t.is_margin = Some(v);
        }),
        FieldDescriptor::new("is_manual", "Manual", |t: &mut Transaction, v: bool| {
            t.is_manual = Some(v);
        }),
        FieldDescriptor::new("min_volume", "Min volume", |t: &mut Transaction, v: Decimal| {
            t.min_volume = Some(v);
        }),
        FieldDescriptor::new(
            "position_effect",
            "Position effect",
            |t: &mut Transaction, v: PositionEffect| t.position_effect = Some(v),
        ),
        FieldDescriptor::new("post_only", "Post only", |t: &mut Transaction, v: bool| {
            t.post_only = Some(v);
        }),
        FieldDescriptor::new("initiator", "Initiator", |t: &mut Transaction, v: bool| {
            t.initiator = Some(v);
        }),
        FieldDescriptor::new("seq_num", "Sequence number", |t: &mut Transaction, v: i64| {
            t.seq_num = Some(v);
        }),
        FieldDescriptor::new("leverage", "Leverage", |t: &mut Transaction, v: i32| {
            t.leverage = Some(v);
        }),
    ]);
    fields
}

fn candle_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<Candle>();
    fields.extend([
        FieldDescriptor::new("date", "Date", |c: &mut Candle, v: DateTime<FixedOffset>| {
            c.open_time = with_date(c.open_time, v);
            if let Some(close) = c.close_time {
                c.close_time = Some(with_date(close, v));
            }
        })
        .required(),
        FieldDescriptor::new("time", "Open time", |c: &mut Candle, v: TimeDelta| {
            c.open_time = add_span(c.open_time, v);
        }),
        FieldDescriptor::new("close_time", "Close time", |c: &mut Candle, v: TimeDelta| {
            let base = c.close_time.unwrap_or_else(|| start_of_day(c.open_time));
            c.close_time = Some(add_span(base, v));
        })
        .describe("Time of day on the open date"),
        FieldDescriptor::new("open_price", "Open", |c: &mut Candle, v: Decimal| c.open_price = v)
            .required(),
        FieldDescriptor::new("high_price", "High", |c: &mut Candle, v: Decimal| c.high_price = v)
            .required(),
        FieldDescriptor::new("low_price", "Low", |c: &mut Candle, v: Decimal| c.low_price = v)
            .required(),
        FieldDescriptor::new("close_price", "Close", |c: &mut Candle, v: Decimal| {
            c.close_price = v;
        })
        .required(),
        FieldDescriptor::new("total_volume", "Volume", |c: &mut Candle, v: Decimal| {
            c.total_volume = v;
        })
        .required(),
        FieldDescriptor::new("open_interest", "Open interest", |c: &mut Candle, v: Decimal| {
            c.open_interest = Some(v);
        }),
        FieldDescriptor::new("up_ticks", "Up ticks", |c: &mut Candle, v: i32| {
            c.up_ticks = Some(v);
        }),
        FieldDescriptor::new("down_ticks", "Down ticks", |c: &mut Candle, v: i32| {
            c.down_ticks = Some(v);
        }),
        FieldDescriptor::new("total_ticks", "Ticks", |c: &mut Candle, v: i32| {
            c.total_ticks = Some(v);
        }),
    ]);
    fields
}

fn depth_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<QuoteLevel>();
    fields.extend(time_fields::<QuoteLevel>());
    fields.extend([
        FieldDescriptor::new("price", "Price", |q: &mut QuoteLevel, v: Decimal| q.price = v)
            .required(),
        FieldDescriptor::new("volume", "Volume", |q: &mut QuoteLevel, v: Decimal| q.volume = v)
            .required(),
        FieldDescriptor::new("side", "Side", |q: &mut QuoteLevel, v: Side| q.side = Some(v))
            .required(),
        FieldDescriptor::new("orders_count", "Orders", |q: &mut QuoteLevel, v: i32| {
            q.orders_count = Some(v);
        }),
        FieldDescriptor::new("condition", "Condition", |q: &mut QuoteLevel, v: QuoteCondition| {
            q.condition = Some(v);
        }),
        FieldDescriptor::new("start_position", "Start position", |q: &mut QuoteLevel, v: i32| {
            q.start_position = Some(v);
        }),
        FieldDescriptor::new("end_position", "End position", |q: &mut QuoteLevel, v: i32| {
            q.end_position = Some(v);
        }),
        FieldDescriptor::new("action", "Action", |q: &mut QuoteLevel, v: QuoteAction| {
            q.action = Some(v);
        }),
    ]);
    fields
}

fn level1_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<Level1Update>();
    fields.extend(time_fields::<Level1Update>());
    fields.extend(LEVEL1_FIELDS.iter().map(|spec| {
        let field = spec.field;
        match spec.kind {
            Level1Kind::Decimal => FieldDescriptor::new(
                spec.key,
                spec.display_name,
                move |u: &mut Level1Update, v: Decimal| u.set_decimal(field, v),
            ),
            Level1Kind::Integer => FieldDescriptor::new(
                spec.key,
                spec.display_name,
                move |u: &mut Level1Update, v: i64| {
                    u.changes.insert(field, Level1Value::Integer(v));
                },
            ),
            Level1Kind::Time => FieldDescriptor::new(
                spec.key,
                spec.display_name,
                move |u: &mut Level1Update, v: DateTime<FixedOffset>| {
                    u.changes.insert(field, Level1Value::Time(v));
                },
            ),
            Level1Kind::Side => FieldDescriptor::new(
                spec.key,
                spec.display_name,
                move |u: &mut Level1Update, v: Side| {
                    u.changes.insert(field, Level1Value::Side(v));
                },
            ),
        }
    }));
    fields
}

fn position_fields() -> Vec<FieldDescriptor> {
    let mut fields = id_fields::<PositionUpdate>();
    fields.extend(time_fields::<PositionUpdate>());
    fields.extend([
        FieldDescriptor::new("strategy_id", "Strategy", |p: &mut PositionUpdate, v: String| {
            p.strategy_id = Some(v);
        }),
        FieldDescriptor::new("side", "Side", |p: &mut PositionUpdate, v: Side| p.side = Some(v)),
    ]);
    fields.extend(POSITION_FIELDS.iter().map(|&(kind, key, display_name)| {
        FieldDescriptor::new(key, display_name, move |p: &mut PositionUpdate, v: Decimal| {
            p.set_change(kind, v);
        })
    }));
    fields
}

fn news_fields() -> Vec<FieldDescriptor> {
    let mut fields = vec![
        FieldDescriptor::new("id", "Id", |n: &mut NewsItem, v: String| n.id = v).required(),
        FieldDescriptor::new("security_code", "Security code", |n: &mut NewsItem, v: String| {
            n.security_code = Some(v);
        }),
        FieldDescriptor::new("board_code", "Board code", |n: &mut NewsItem, v: String| {
            n.board_code = Some(v);
        }),
    ];
    fields.extend(time_fields::<NewsItem>());
    fields.extend([
        FieldDescriptor::new("headline", "Headline", |n: &mut NewsItem, v: String| {
            n.headline = Some(v);
        }),
        FieldDescriptor::new("story", "Story", |n: &mut NewsItem, v: String| n.story = Some(v)),
        FieldDescriptor::new("source", "Source", |n: &mut NewsItem, v: String| {
            n.source = Some(v);
        }),
        FieldDescriptor::new("url", "Url", |n: &mut NewsItem, v: String| n.url = Some(v)),
        FieldDescriptor::new("priority", "Priority", |n: &mut NewsItem, v: NewsPriority| {
            n.priority = Some(v);
        }),
        FieldDescriptor::new("language", "Language", |n: &mut NewsItem, v: String| {
            n.language = Some(v);
        }),
    ]);
    fields
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_case::test_case;

    use super::*;
    use crate::domain::mapping::{ReferenceZone, ValueType};
    use crate::domain::messages::Message;

    fn all_schemas() -> Vec<DataSchema> {
        vec![
            DataSchema::Securities,
            DataSchema::Boards,
            DataSchema::BoardStates,
            DataSchema::Ticks,
            DataSchema::OrderLog,
            DataSchema::Transactions,
            DataSchema::Candles { time_frame: None },
            DataSchema::Depth,
            DataSchema::Level1,
            DataSchema::Positions,
            DataSchema::News,
        ]
    }

    #[test]
    fn every_schema_has_unique_non_empty_fields() {
        for schema in all_schemas() {
            let fields = descriptors(schema);
            assert!(!fields.is_empty(), "{schema}");
            let names: HashSet<_> = fields.iter().map(FieldDescriptor::name).collect();
            assert_eq!(names.len(), fields.len(), "duplicate names in {schema}");
        }
    }

    #[test]
    fn adapter_fields_only_describe_securities() {
        for schema in all_schemas() {
            let has_adapter = descriptors(schema).iter().any(FieldDescriptor::is_adapter_field);
            assert_eq!(has_adapter, schema == DataSchema::Securities, "{schema}");
        }
    }

    #[test_case(DataSchema::OrderLog, &["order_id", "order_price", "order_volume", "side", "order_state", "trade_id", "trade_price"])]
    #[test_case(DataSchema::Transactions, &["portfolio_name", "order_price", "order_volume", "balance", "order_type", "order_state", "trade_id", "trade_price"])]
    fn execution_required_fields(schema: DataSchema, expected: &[&str]) {
        let required: Vec<_> = descriptors(schema)
            .iter()
            .filter(|f| f.is_required())
            .map(FieldDescriptor::name)
            .filter(|name| !matches!(*name, "security_code" | "board_code" | "date"))
            .collect();
        assert_eq!(required, expected);
    }

    #[test]
    fn date_precedes_time() {
        for schema in all_schemas() {
            let names: Vec<_> = descriptors(schema).iter().map(FieldDescriptor::name).collect();
            if let (Some(d), Some(t)) = (
                names.iter().position(|n| *n == "date"),
                names.iter().position(|n| *n == "time"),
            ) {
                assert!(d < t, "{schema}");
            }
        }
    }

    #[test]
    fn fields_write_to_the_schema_message() {
        for schema in all_schemas() {
            for mut field in descriptors(schema) {
                if field.is_adapter_field() {
                    continue;
                }
                let mut message = schema.blank_message();
                let sample = match field.value_type() {
                    ValueType::Decimal | ValueType::Integer => "1",
                    ValueType::Bool => "true",
                    ValueType::String => "x",
                    ValueType::DateTime => "2023-01-01",
                    ValueType::TimeSpan => "10:00",
                    ValueType::Enum(_) => "0",
                };
                let result = field.apply_file_value(&mut message, sample, &ReferenceZone::Utc);
                assert!(result.is_ok(), "{schema}.{}: {result:?}", field.name());
            }
        }
    }

    #[test]
    fn security_code_and_board_use_copy_on_write() {
        let mut fields = descriptors(DataSchema::Ticks);
        let mut message = DataSchema::Ticks.blank_message();
        for field in &mut fields {
            let raw = match field.name() {
                "security_code" => "SBER",
                "board_code" => "TQBR",
                _ => continue,
            };
            field.apply_file_value(&mut message, raw, &ReferenceZone::Utc).unwrap();
        }
        assert_eq!(
            message.security_id().map(ToString::to_string),
            Some("SBER@TQBR".to_string())
        );
        assert!(matches!(message, Message::Tick(_)));
    }

    #[test]
    fn candle_close_time_is_on_open_date() {
        let mut fields = descriptors(DataSchema::Candles { time_frame: None });
        let mut message = Message::Candle(Candle::default());
        for field in &mut fields {
            let raw = match field.name() {
                "date" => "2023-03-01",
                "time" => "10:00",
                "close_time" => "10:05",
                _ => continue,
            };
            field.apply_file_value(&mut message, raw, &ReferenceZone::Utc).unwrap();
        }
        let Message::Candle(candle) = message else {
            panic!("candle");
        };
        assert_eq!(candle.open_time.to_rfc3339(), "2023-03-01T10:00:00+00:00");
        assert_eq!(
            candle.close_time.map(|t| t.to_rfc3339()),
            Some("2023-03-01T10:05:00+00:00".to_string())
        );
    }

    fn apply_named(schema: DataSchema, values: &[(&str, &str)]) -> Message {
        let mut message = schema.blank_message();
        for mut field in descriptors(schema) {
            if let Some((_, raw)) = values.iter().find(|(name, _)| *name == field.name()) {
                field.apply_file_value(&mut message, raw, &ReferenceZone::Utc).unwrap();
            }
        }
        message
    }

    #[test]
    fn security_option_and_underlying_fields() {
        let message = apply_named(
            DataSchema::Securities,
            &[
                ("security_code", "RI100000BX3"),
                ("underlying_security_min_volume", "10"),
                ("binary_option_type", "CashOrNothing"),
            ],
        );
        let Message::Security(security) = message else {
            panic!("security");
        };
        assert_eq!(security.underlying_security_min_volume, Some(Decimal::TEN));
        assert_eq!(security.binary_option_type.as_deref(), Some("CashOrNothing"));
    }

    #[test]
    fn transaction_position_effect() {
        let message = apply_named(DataSchema::Transactions, &[("position_effect", "closeonly")]);
        let Message::Transaction(transaction) = message else {
            panic!("transaction");
        };
        assert_eq!(transaction.position_effect, Some(PositionEffect::CloseOnly));
    }

    #[test]
    fn date_keeps_time_from_full_timestamp() {
        let current = DateTime::<FixedOffset>::default();
        let Ok(date) = DateTime::parse_from_rfc3339("2023-01-15T10:30:00+03:00") else {
            panic!("valid timestamp");
        };
        assert_eq!(with_date(current, date), date);
    }
}

//! Streaming row parser.
//!
//! [`CsvParser`] tokenizes a byte stream and turns each row into messages
//! through a [`FieldSet`]. It is a lazy, non-restartable iterator: the first
//! error or an observed cancellation ends it.

mod quote_aggregator;
mod row;

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Terminator};
use tokio_util::sync::CancellationToken;

pub use quote_aggregator::QuoteAggregator;
pub use row::{RowOutcome, RowProcessor};

use crate::domain::mapping::{FieldSet, ReferenceZone};
use crate::domain::messages::Message;
use crate::error::{ConfigurationError, ImportError};

/// Row terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineSeparator {
    /// `\r\n`, `\n` or `\r`.
    #[default]
    Crlf,
    /// A single custom byte.
    Byte(u8),
}

impl LineSeparator {
    const fn terminator(self) -> Terminator {
        match self {
            Self::Crlf => Terminator::CRLF,
            Self::Byte(b) => Terminator::Any(b),
        }
    }
}

impl FromStr for LineSeparator {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "" | "CRLF" | "\r\n" => Ok(Self::Crlf),
            "LF" | "\\N" | "\n" => Ok(Self::Byte(b'\n')),
            "CR" | "\\R" | "\r" => Ok(Self::Byte(b'\r')),
            _ => single_ascii(s).map(Self::Byte).ok_or_else(|| ConfigurationError::InvalidSetting {
                name: "line_separator".to_string(),
                value: s.to_string(),
                reason: "expected CRLF, LF, CR or a single ASCII character".to_string(),
            }),
        }
    }
}

/// Parse a column separator; `TAB` (any case) means the tab character.
pub fn parse_column_separator(raw: &str) -> Result<u8, ConfigurationError> {
    if raw.eq_ignore_ascii_case("TAB") || raw == "\\t" {
        return Ok(b'\t');
    }
    single_ascii(raw).ok_or_else(|| ConfigurationError::InvalidSetting {
        name: "column_separator".to_string(),
        value: raw.to_string(),
        reason: "expected TAB or a single ASCII character".to_string(),
    })
}

fn single_ascii(raw: &str) -> Option<u8> {
    match raw.as_bytes() {
        [b] if b.is_ascii() => Some(*b),
        _ => None,
    }
}

/// Tokenizer and row conversion settings.
#[derive(Debug, Clone)]
pub struct ParserSettings {
    /// Column delimiter.
    pub column_separator: u8,
    /// Row terminator.
    pub line_separator: LineSeparator,
    /// Header lines to skip.
    pub skip_lines: usize,
    /// Zone applied to timestamps without an explicit offset.
    pub time_zone: ReferenceZone,
    /// Drop security rows without code or board instead of failing.
    pub ignore_non_id_securities: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            column_separator: b',',
            line_separator: LineSeparator::Crlf,
            skip_lines: 0,
            time_zone: ReferenceZone::Utc,
            ignore_non_id_securities: true,
        }
    }
}

/// An input stream with its length when known.
#[derive(Debug)]
pub struct ImportInput<R> {
    /// Byte stream.
    pub reader: R,
    /// Total length, for progress reporting.
    pub length: Option<u64>,
}

impl<R: Read> ImportInput<R> {
    /// Input of unknown length; no progress is reported.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            length: None,
        }
    }

    /// Input of known length.
    #[must_use]
    pub const fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }
}

impl ImportInput<File> {
    /// File input; the length comes from file metadata.
    pub fn seekable(file: File) -> std::io::Result<Self> {
        let length = file.metadata()?.len();
        Ok(Self::new(file).with_length(length))
    }
}

/// Lazy message sequence over a delimited byte stream.
pub struct CsvParser<'f, R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
    fields: &'f mut FieldSet,
    rows: RowProcessor,
    pending: VecDeque<Message>,
    skip_lines: usize,
    records_read: u64,
    cancel: CancellationToken,
    cancelled: bool,
    done: bool,
}

impl<'f, R: Read> CsvParser<'f, R> {
    /// Create a parser. The field set is reset before the first row.
    pub fn new(
        reader: R,
        fields: &'f mut FieldSet,
        settings: &ParserSettings,
        cancel: CancellationToken,
    ) -> Self {
        fields.reset();
        for field in fields.iter() {
            if field.is_required() && field.column().is_none() && field.default_value().is_none() {
                tracing::warn!(
                    schema = %fields.schema(),
                    field = field.name(),
                    "Required field has neither a column nor a default value"
                );
            }
        }

        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(settings.column_separator)
            .terminator(settings.line_separator.terminator())
            .from_reader(reader);

        Self {
            reader,
            record: StringRecord::new(),
            fields,
            rows: RowProcessor::new(settings.time_zone, settings.ignore_non_id_securities),
            pending: VecDeque::new(),
            skip_lines: settings.skip_lines,
            records_read: 0,
            cancel,
            cancelled: false,
            done: false,
        }
    }

    /// Bytes consumed from the input so far.
    pub fn bytes_read(&self) -> u64 {
        self.reader.position().byte()
    }

    /// Iteration stopped because cancellation was observed.
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn stop_cancelled(&mut self) {
        self.cancelled = true;
        self.done = true;
        self.pending.clear();
        self.rows.abandon();
    }

    fn read_next(&mut self) -> Result<(), ImportError> {
        if !self.reader.read_record(&mut self.record)? {
            self.done = true;
            self.rows.finish(&mut self.pending);
            return Ok(());
        }

        self.records_read += 1;
        if self.records_read <= self.skip_lines as u64 {
            return Ok(());
        }

        let line = self
            .record
            .position()
            .map_or(self.records_read, csv::Position::line);
        let outcome = self.rows.process(
            self.fields,
            line,
            &self.record,
            &self.cancel,
            &mut self.pending,
        )?;
        if outcome == RowOutcome::Cancelled {
            self.stop_cancelled();
        }
        Ok(())
    }
}

impl<R: Read> Iterator for CsvParser<'_, R> {
    type Item = Result<Message, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancelled {
                return None;
            }
            if self.cancel.is_cancelled() {
                self.stop_cancelled();
                return None;
            }
            if let Some(message) = self.pending.pop_front() {
                return Some(Ok(message));
            }
            if self.done {
                return None;
            }
            if let Err(err) = self.read_next() {
                self.done = true;
                self.pending.clear();
                return Some(Err(err));
            }
        }
    }
}

impl<R: Read> fmt::Debug for CsvParser<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvParser")
            .field("schema", &self.fields.schema())
            .field("records_read", &self.records_read)
            .field("pending", &self.pending.len())
            .field("cancelled", &self.cancelled)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::mapping::FieldSettings;
    use crate::domain::messages::Tick;

    fn tick_fields() -> FieldSet {
        let mut fields = FieldSet::for_tag("ticks").unwrap();
        fields
            .configure(&[
                FieldSettings::new("security_code").with_column(0),
                FieldSettings::new("board_code").with_column(1),
                FieldSettings::new("date").with_column(2).with_format("yyyyMMdd"),
                FieldSettings::new("time").with_column(3).with_format("HHmmss"),
                FieldSettings::new("trade_price").with_column(4),
                FieldSettings::new("trade_volume").with_column(5),
            ])
            .unwrap();
        fields
    }

    fn parse(input: &str, fields: &mut FieldSet, settings: &ParserSettings) -> Vec<Result<Message, ImportError>> {
        CsvParser::new(input.as_bytes(), fields, settings, CancellationToken::new()).collect()
    }

    #[test_case("TAB", b'\t')]
    #[test_case("tab", b'\t')]
    #[test_case(";", b';')]
    #[test_case(",", b',')]
    fn column_separators(raw: &str, expected: u8) {
        assert_eq!(parse_column_separator(raw).unwrap(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case(";;"; "two characters")]
    fn invalid_column_separators(raw: &str) {
        assert!(parse_column_separator(raw).is_err());
    }

    #[test_case("CRLF", LineSeparator::Crlf)]
    #[test_case("lf", LineSeparator::Byte(b'\n'))]
    #[test_case("|", LineSeparator::Byte(b'|'))]
    fn line_separators(raw: &str, expected: LineSeparator) {
        assert_eq!(raw.parse::<LineSeparator>().unwrap(), expected);
    }

    #[test]
    fn parses_rows_after_header() {
        let mut fields = tick_fields();
        let settings = ParserSettings {
            skip_lines: 1,
            ..ParserSettings::default()
        };
        let input = "code,board,date,time,price,volume\r\nSBER,TQBR,20230115,103000,250.5,10\r\n";

        let messages = parse(input, &mut fields, &settings);

        assert_eq!(messages.len(), 1);
        let Ok(Message::Tick(tick)) = &messages[0] else {
            panic!("expected tick, got {:?}", messages[0]);
        };
        assert_eq!(tick.security_id.to_string(), "SBER@TQBR");
        assert_eq!(tick.server_time.to_rfc3339(), "2023-01-15T10:30:00+00:00");
        assert_eq!(tick.price, rust_decimal::Decimal::new(2505, 1));
    }

    #[test]
    fn tab_and_custom_line_separator() {
        let mut fields = tick_fields();
        let settings = ParserSettings {
            column_separator: parse_column_separator("TAB").unwrap(),
            line_separator: "|".parse().unwrap(),
            ..ParserSettings::default()
        };
        let input = "SBER\tTQBR\t20230115\t103000\t1\t1|GAZP\tTQBR\t20230115\t103001\t2\t1|";

        let messages = parse(input, &mut fields, &settings);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| matches!(m, Ok(Message::Tick(_)))));
    }

    #[test]
    fn conversion_error_stops_the_sequence() {
        let mut fields = tick_fields();
        let input = "SBER,TQBR,20230115,103000,abc,10\nSBER,TQBR,20230115,103001,1,1\n";

        let messages = parse(input, &mut fields, &ParserSettings::default());

        assert_eq!(messages.len(), 1);
        let Err(ImportError::FieldConversion(err)) = &messages[0] else {
            panic!("expected conversion error");
        };
        assert_eq!(err.line, 1);
        assert_eq!(err.column, Some(4));
        assert_eq!(err.value, "abc");
        assert_eq!(err.field, "Price");
    }

    #[test]
    fn short_row_is_a_conversion_error() {
        let mut fields = tick_fields();
        let messages = parse("SBER,TQBR,20230115\n", &mut fields, &ParserSettings::default());
        assert!(matches!(messages[0], Err(ImportError::FieldConversion(_))));
    }

    #[test]
    fn cancelled_token_yields_nothing() {
        let mut fields = tick_fields();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut parser = CsvParser::new(
            "SBER,TQBR,20230115,103000,1,1\n".as_bytes(),
            &mut fields,
            &ParserSettings::default(),
            cancel,
        );
        assert!(parser.next().is_none());
        assert!(parser.is_cancelled());
    }

    #[test]
    fn cancellation_mid_stream_stops_emission() {
        let mut fields = tick_fields();
        let cancel = CancellationToken::new();
        let input = "SBER,TQBR,20230115,103000,1,1\nSBER,TQBR,20230115,103001,1,1\n";
        let mut parser =
            CsvParser::new(input.as_bytes(), &mut fields, &ParserSettings::default(), cancel.clone());

        assert!(matches!(parser.next(), Some(Ok(Message::Tick(Tick { .. })))));
        cancel.cancel();
        assert!(parser.next().is_none());
        assert!(parser.next().is_none());
    }

    #[test]
    fn strict_mode_rejects_unidentified_securities() {
        let mut fields = FieldSet::for_tag("securities").unwrap();
        fields
            .configure(&[
                FieldSettings::new("security_code").with_column(0),
                FieldSettings::new("board_code").with_column(1),
            ])
            .unwrap();
        let strict = ParserSettings {
            ignore_non_id_securities: false,
            ..ParserSettings::default()
        };

        let lenient = parse("SBER,\nGAZP,TQBR\n", &mut fields, &ParserSettings::default());
        assert_eq!(lenient.len(), 1);

        let messages = parse("SBER,\nGAZP,TQBR\n", &mut fields, &strict);
        assert!(matches!(
            messages[0],
            Err(ImportError::SecurityIdentity { line: 1, .. })
        ));
    }

    #[test]
    fn depth_rows_are_merged() {
        let mut fields = FieldSet::for_tag("depth").unwrap();
        fields
            .configure(&[
                FieldSettings::new("security_code").with_column(0),
                FieldSettings::new("board_code").with_default("TQBR"),
                FieldSettings::new("date").with_column(1),
                FieldSettings::new("price").with_column(2),
                FieldSettings::new("volume").with_column(3),
                FieldSettings::new("side").with_column(4),
            ])
            .unwrap();
        let input = "SBER,2023-01-01 10:00:00,100,5,Buy\n\
                     SBER,2023-01-01 10:00:00,101,3,Sell\n\
                     SBER,2023-01-01 10:00:01,100,4,Buy\n";

        let messages: Vec<_> = parse(input, &mut fields, &ParserSettings::default())
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(messages.len(), 2);
        let Message::QuoteSnapshot(first) = &messages[0] else {
            panic!("expected snapshot");
        };
        assert_eq!((first.bids.len(), first.asks.len()), (1, 1));
    }

    #[test]
    fn depth_row_without_side_is_rejected() {
        let mut fields = FieldSet::for_tag("depth").unwrap();
        fields
            .configure(&[
                FieldSettings::new("security_code").with_column(0),
                FieldSettings::new("board_code").with_default("TQBR"),
                FieldSettings::new("date").with_column(1),
                FieldSettings::new("price").with_column(2),
                FieldSettings::new("volume").with_column(3),
            ])
            .unwrap();

        let messages = parse("SBER,2023-01-01,100,5\n", &mut fields, &ParserSettings::default());
        let Err(ImportError::FieldConversion(err)) = &messages[0] else {
            panic!("expected missing side");
        };
        assert_eq!(err.field, "Side");
    }

    #[test]
    fn adapter_mappings_precede_the_security() {
        let mut fields = FieldSet::for_tag("securities").unwrap();
        fields
            .configure(&[
                FieldSettings::new("security_code").with_column(0),
                FieldSettings::new("board_code").with_column(1),
                FieldSettings::new("adapter.security_code").with_column(2).for_adapter("vendor"),
            ])
            .unwrap();

        let messages: Vec<_> = parse("SBER,TQBR,SBER.MM\nGAZP,TQBR,\n", &mut fields, &ParserSettings::default())
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(messages.len(), 3);
        let Message::SecurityMapping(mapping) = &messages[0] else {
            panic!("expected mapping first");
        };
        assert_eq!(mapping.adapter, "vendor");
        assert_eq!(mapping.adapter_id.to_string(), "SBER.MM@TQBR");
        assert_eq!(mapping.security_id.to_string(), "SBER@TQBR");
        assert!(matches!(messages[1], Message::Security(_)));
        assert!(matches!(messages[2], Message::Security(_)));
    }
}

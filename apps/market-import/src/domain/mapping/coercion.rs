//! Text to value conversion.
//!
//! Numbers tolerate comma decimal separators and embedded spaces. Date and
//! time formats use the familiar `yyyy-MM-dd HH:mm:ss.fff` token style and
//! are translated once into a chrono pattern, then cached on the descriptor
//! as a [`CompiledFormat`].

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;

use super::value::time_of_day;
use super::zone::ReferenceZone;

/// Parse a decimal cell. `Ok(None)` when nothing remains after normalizing.
pub fn parse_decimal(raw: &str) -> Result<Option<Decimal>, String> {
    if raw.contains(['e', 'E']) {
        let value = f64::from_str(raw.trim())
            .map_err(|e| format!("invalid number: {e}"))?;
        return Decimal::try_from(value)
            .map(Some)
            .map_err(|e| format!("number out of range: {e}"));
    }

    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if normalized.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&normalized)
        .map(Some)
        .map_err(|e| format!("invalid decimal: {e}"))
}

/// Parse an integer cell. `Ok(None)` when the cell is blank.
pub fn parse_integer(raw: &str) -> Result<Option<i64>, String> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if normalized.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = normalized.parse::<i64>() {
        return Ok(Some(value));
    }
    // "10.0" style integers from spreadsheet exports
    match parse_decimal(&normalized)? {
        Some(d) if d.fract().is_zero() => i64::try_from(d)
            .map(Some)
            .map_err(|_| format!("integer out of range: {normalized}")),
        _ => Err(format!("invalid integer: {normalized}")),
    }
}

/// Parse a boolean cell.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => Err(format!("invalid boolean: {other}")),
    }
}

/// Resolution of an epoch-number timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    /// `unix`
    Seconds,
    /// `unix_millis`
    Millis,
    /// `unix_micros`
    Micros,
    /// `unix_nanos`
    Nanos,
}

impl EpochUnit {
    fn from_sentinel(format: &str) -> Option<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "unix" => Some(Self::Seconds),
            "unix_millis" | "unix_ms" => Some(Self::Millis),
            "unix_micros" | "unix_mcs" => Some(Self::Micros),
            "unix_nanos" | "unix_ns" => Some(Self::Nanos),
            _ => None,
        }
    }

    fn to_datetime(self, value: i64) -> Option<DateTime<FixedOffset>> {
        let utc = match self {
            Self::Seconds => DateTime::from_timestamp(value, 0)?,
            Self::Millis => DateTime::from_timestamp_millis(value)?,
            Self::Micros => DateTime::from_timestamp_micros(value)?,
            Self::Nanos => DateTime::from_timestamp_nanos(value),
        };
        Some(utc.fixed_offset())
    }

    fn to_span(self, value: i64) -> Option<TimeDelta> {
        match self {
            Self::Seconds => TimeDelta::try_seconds(value),
            Self::Millis => TimeDelta::try_milliseconds(value),
            Self::Micros => Some(TimeDelta::microseconds(value)),
            Self::Nanos => Some(TimeDelta::nanoseconds(value)),
        }
    }
}

/// A chrono pattern translated from a file format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    chrono: String,
    has_date: bool,
    has_time: bool,
    has_offset: bool,
}

impl Pattern {
    /// Translate a `yyyy-MM-dd HH:mm:ss.fff zzz` style format.
    ///
    /// `span` switches `h` to a 24-hour count, as used by time-of-day
    /// formats.
    pub fn translate(format: &str, span: bool) -> Result<Self, String> {
        let chars: Vec<char> = format.chars().collect();
        let mut out = String::with_capacity(format.len() * 2);
        let mut has_date = false;
        let mut has_time = false;
        let mut has_offset = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            let mut consumed = run;
            match c {
                'y' => {
                    out.push_str(if run >= 3 { "%Y" } else { "%y" });
                    has_date = true;
                }
                'M' => {
                    out.push_str(match run {
                        1 | 2 => "%m",
                        3 => "%b",
                        _ => "%B",
                    });
                    has_date = true;
                }
                'd' => {
                    out.push_str(match run {
                        1 | 2 => "%d",
                        3 => "%a",
                        _ => "%A",
                    });
                    has_date |= run <= 2;
                }
                'H' => {
                    out.push_str("%H");
                    has_time = true;
                }
                'h' => {
                    out.push_str(if span { "%H" } else { "%I" });
                    has_time = true;
                }
                'm' => {
                    out.push_str("%M");
                    has_time = true;
                }
                's' => {
                    out.push_str("%S");
                    has_time = true;
                }
                'f' | 'F' => {
                    // After a '.', any number of fraction digits is accepted.
                    if i > 0 && chars[i - 1] == '.' && out.ends_with('.') {
                        out.pop();
                        out.push_str("%.f");
                    } else {
                        out.push_str(match run {
                            3 => "%3f",
                            6 => "%6f",
                            9 => "%9f",
                            _ => {
                                return Err(format!(
                                    "fraction of {run} digits needs a '.' before it in format '{format}'"
                                ));
                            }
                        });
                    }
                    has_time = true;
                }
                't' => out.push_str("%p"),
                'z' | 'K' => {
                    out.push_str("%#z");
                    has_offset = true;
                }
                '\\' => {
                    let Some(next) = chars.get(i + 1) else {
                        return Err(format!("dangling escape in format '{format}'"));
                    };
                    push_literal(&mut out, *next);
                    consumed = 2;
                }
                '\'' | '"' => {
                    let Some(len) = chars[i + 1..].iter().position(|&x| x == c) else {
                        return Err(format!("unterminated quote in format '{format}'"));
                    };
                    for &lit in &chars[i + 1..i + 1 + len] {
                        push_literal(&mut out, lit);
                    }
                    consumed = len + 2;
                }
                _ => {
                    consumed = 1;
                    push_literal(&mut out, c);
                }
            }
            i += consumed;
        }

        if !has_date && !has_time {
            return Err(format!("format '{format}' has no date or time tokens"));
        }

        Ok(Self {
            chrono: out,
            has_date,
            has_time,
            has_offset,
        })
    }

    /// The translated chrono pattern.
    #[must_use]
    pub fn as_chrono(&self) -> &str {
        &self.chrono
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Format parser compiled from a descriptor's `Format` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledFormat {
    /// Epoch integer in the given unit.
    Epoch(EpochUnit),
    /// Explicit pattern.
    Pattern(Pattern),
    /// No format configured; try the common layouts.
    Default,
}

const DEFAULT_DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y%m%d %H:%M:%S%.f",
    "%Y%m%d%H%M%S",
    "%d.%m.%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DEFAULT_DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%d.%m.%Y", "%m/%d/%Y"];

const DEFAULT_TIME_LAYOUTS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%H%M%S"];

impl CompiledFormat {
    /// Compile a format string; `None` or blank selects the default layouts.
    pub fn compile(format: Option<&str>, span: bool) -> Result<Self, String> {
        let Some(format) = format.filter(|f| !f.trim().is_empty()) else {
            return Ok(Self::Default);
        };
        if let Some(unit) = EpochUnit::from_sentinel(format) {
            return Ok(Self::Epoch(unit));
        }
        Pattern::translate(format, span).map(Self::Pattern)
    }

    /// Parse a timestamp; local results take their offset from `zone`.
    pub fn parse_datetime(
        &self,
        raw: &str,
        zone: &ReferenceZone,
    ) -> Result<DateTime<FixedOffset>, String> {
        let raw = raw.trim();
        match self {
            Self::Epoch(unit) => {
                let value = parse_integer(raw)?.ok_or("empty timestamp")?;
                unit.to_datetime(value)
                    .ok_or_else(|| format!("timestamp {value} out of range"))
            }
            Self::Pattern(pattern) => parse_with_pattern(pattern, raw, zone),
            Self::Default => parse_default_datetime(raw, zone),
        }
    }

    /// Parse a time of day or duration.
    pub fn parse_timespan(&self, raw: &str) -> Result<TimeDelta, String> {
        let raw = raw.trim();
        match self {
            Self::Epoch(unit) => {
                let value = parse_integer(raw)?.ok_or("empty time span")?;
                unit.to_span(value)
                    .ok_or_else(|| format!("time span {value} out of range"))
            }
            Self::Pattern(pattern) => NaiveTime::parse_from_str(raw, &pattern.chrono)
                .map(time_of_day)
                .map_err(|e| format!("does not match '{}': {e}", pattern.chrono)),
            Self::Default => DEFAULT_TIME_LAYOUTS
                .iter()
                .find_map(|layout| NaiveTime::parse_from_str(raw, layout).ok())
                .map(time_of_day)
                .ok_or_else(|| "unrecognized time of day".to_string()),
        }
    }
}

fn parse_with_pattern(
    pattern: &Pattern,
    raw: &str,
    zone: &ReferenceZone,
) -> Result<DateTime<FixedOffset>, String> {
    let fmt = pattern.chrono.as_str();
    let mismatch = |e: chrono::ParseError| format!("does not match '{fmt}': {e}");

    if pattern.has_offset {
        return DateTime::parse_from_str(raw, fmt).map_err(mismatch);
    }
    let local = match (pattern.has_date, pattern.has_time) {
        (true, true) => NaiveDateTime::parse_from_str(raw, fmt).map_err(mismatch)?,
        (true, false) => NaiveDate::parse_from_str(raw, fmt)
            .map_err(mismatch)?
            .and_time(NaiveTime::MIN),
        _ => NaiveDate::default().and_time(NaiveTime::parse_from_str(raw, fmt).map_err(mismatch)?),
    };
    Ok(zone.localize(local))
}

fn parse_default_datetime(raw: &str, zone: &ReferenceZone) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    if let Some(local) = DEFAULT_DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
    {
        return Ok(zone.localize(local));
    }
    DEFAULT_DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(raw, layout).ok())
        .map(|date| zone.localize(date.and_time(NaiveTime::MIN)))
        .ok_or_else(|| "unrecognized date/time".to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    #[test_case("100.5", Some("100.5"))]
    #[test_case("100,5", Some("100.5"))]
    #[test_case(" 1 000,25 ", Some("1000.25"))]
    #[test_case("1\u{a0}000", Some("1000"))]
    #[test_case("1.5e2", Some("150"))]
    #[test_case("   ", None)]
    fn decimal_normalization(raw: &str, expected: Option<&str>) {
        let expected = expected.map(|s| Decimal::from_str(s).unwrap());
        assert_eq!(parse_decimal(raw).unwrap(), expected);
    }

    #[test]
    fn decimal_garbage_is_an_error() {
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("1e400").is_err());
    }

    #[test_case("42", Some(42))]
    #[test_case("-7", Some(-7))]
    #[test_case("10.0", Some(10))]
    #[test_case("", None)]
    fn integer_parsing(raw: &str, expected: Option<i64>) {
        assert_eq!(parse_integer(raw).unwrap(), expected);
    }

    #[test]
    fn fractional_integer_is_an_error() {
        assert!(parse_integer("10.5").is_err());
    }

    #[test_case("yyyyMMdd", "%Y%m%d")]
    #[test_case("yyyy-MM-dd HH:mm:ss.fff", "%Y-%m-%d %H:%M:%S%.f")]
    #[test_case("yyyy-MM-dd HH:mm:ss.fffffff", "%Y-%m-%d %H:%M:%S%.f")]
    #[test_case("HH:mm:ss.FFF", "%H:%M:%S%.f")]
    #[test_case("HHmmssfff", "%H%M%S%3f")]
    #[test_case("dd.MM.yy h:mm tt", "%d.%m.%y %I:%M %p")]
    #[test_case("yyyy-MM-ddTHH:mm:sszzz", "%Y-%m-%dT%H:%M:%S%#z")]
    #[test_case("HH'h'mm", "%Hh%M")]
    fn translates_formats(format: &str, chrono: &str) {
        assert_eq!(Pattern::translate(format, false).unwrap().as_chrono(), chrono);
    }

    #[test]
    fn span_format_reads_h_as_hours() {
        let pattern = Pattern::translate("hh\\:mm\\:ss", true).unwrap();
        assert_eq!(pattern.as_chrono(), "%H:%M:%S");
    }

    #[test_case("2023-01-15 10:30:00.1234567", 123_456_700)]
    #[test_case("2023-01-15 10:30:00.5", 500_000_000)]
    #[test_case("2023-01-15 10:30:00.12", 120_000_000)]
    fn seven_digit_fraction_format_reads_any_width(raw: &str, nanos: u32) {
        let format = CompiledFormat::compile(Some("yyyy-MM-dd HH:mm:ss.fffffff"), false).unwrap();
        let dt = format.parse_datetime(raw, &ReferenceZone::Utc).unwrap();
        assert_eq!(dt.nanosecond(), nanos);
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 30, 0));
    }

    #[test_case("10:30:00.25", 37_800_250)]
    #[test_case("10:30:00", 37_800_000)]
    fn optional_fraction_digits(raw: &str, millis: i64) {
        let format = CompiledFormat::compile(Some("HH:mm:ss.FFF"), true).unwrap();
        assert_eq!(format.parse_timespan(raw).unwrap(), TimeDelta::milliseconds(millis));
    }

    #[test]
    fn bare_fraction_of_odd_width_is_rejected() {
        assert!(Pattern::translate("HHmmssfffff", false).is_err());
    }

    #[test]
    fn format_without_tokens_is_rejected() {
        assert!(CompiledFormat::compile(Some("'abc'"), false).is_err());
    }

    #[test]
    fn blank_format_uses_defaults() {
        assert_eq!(CompiledFormat::compile(Some("  "), false), Ok(CompiledFormat::Default));
        assert_eq!(CompiledFormat::compile(None, true), Ok(CompiledFormat::Default));
    }

    #[test]
    fn date_only_format_has_midnight() {
        let format = CompiledFormat::compile(Some("yyyyMMdd"), false).unwrap();
        let dt = format.parse_datetime("20230115", &ReferenceZone::Utc).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 1, 15));
        assert_eq!(dt.num_seconds_from_midnight(), 0);
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }

    #[test]
    fn explicit_offset_wins_over_zone() {
        let format = CompiledFormat::compile(Some("yyyy-MM-dd HH:mm:ss zzz"), false).unwrap();
        let zone: ReferenceZone = "Asia/Tokyo".parse().unwrap();
        let dt = format.parse_datetime("2023-06-01 12:00:00 +02:00", &zone).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
    }

    #[test_case("unix", "1672531200")]
    #[test_case("unix_millis", "1672531200000")]
    #[test_case("unix_micros", "1672531200000000")]
    #[test_case("unix_nanos", "1672531200000000000")]
    fn epoch_sentinels(format: &str, raw: &str) {
        let compiled = CompiledFormat::compile(Some(format), false).unwrap();
        let dt = compiled.parse_datetime(raw, &ReferenceZone::Utc).unwrap();
        assert_eq!(dt.to_rfc3339(), "2023-01-01T00:00:00+00:00");
    }

    #[test]
    fn default_datetime_layouts() {
        let zone: ReferenceZone = "+03:00".parse().unwrap();
        let dt = CompiledFormat::Default
            .parse_datetime("2023-01-15 10:30:00.250", &zone)
            .unwrap();
        assert_eq!(dt.to_rfc3339(), "2023-01-15T10:30:00.250+03:00");

        let dt = CompiledFormat::Default
            .parse_datetime("2023-01-15T10:30:00Z", &zone)
            .unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);

        assert!(CompiledFormat::Default.parse_datetime("yesterday", &zone).is_err());
    }

    #[test]
    fn timespan_parsing() {
        let span = CompiledFormat::Default.parse_timespan("10:30:15.5").unwrap();
        assert_eq!(span, TimeDelta::milliseconds(37_815_500));

        let compiled = CompiledFormat::compile(Some("HHmmss"), true).unwrap();
        assert_eq!(compiled.parse_timespan("093000").unwrap(), TimeDelta::minutes(570));
    }

    proptest! {
        #[test]
        fn decimal_parse_matches_display(mantissa in -1_000_000_000i64..1_000_000_000, scale in 0u32..8) {
            let value = Decimal::new(mantissa, scale);
            prop_assert_eq!(parse_decimal(&value.to_string()).unwrap(), Some(value));
            let with_comma = value.to_string().replace('.', ",");
            prop_assert_eq!(parse_decimal(&with_comma).unwrap(), Some(value));
        }

        #[test]
        fn unix_seconds_are_utc(secs in 0i64..4_000_000_000) {
            let compiled = CompiledFormat::Epoch(EpochUnit::Seconds);
            let dt = compiled.parse_datetime(&secs.to_string(), &ReferenceZone::Utc).unwrap();
            prop_assert_eq!(dt.timestamp(), secs);
        }
    }
}

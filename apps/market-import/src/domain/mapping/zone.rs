//! Reference time zone for timestamps that carry no explicit offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Zone used to derive the UTC offset of a local file timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReferenceZone {
    /// Coordinated universal time.
    #[default]
    Utc,
    /// Fixed offset such as `+03:00`.
    Fixed(FixedOffset),
    /// IANA zone such as `Europe/Moscow`.
    Named(Tz),
}

impl ReferenceZone {
    /// Attach this zone's offset to a local wall-clock time.
    ///
    /// Ambiguous local times resolve to the earlier instant. Times inside a
    /// DST gap keep their wall clock and take the offset in force at that
    /// instant in UTC.
    #[must_use]
    pub fn localize(&self, local: NaiveDateTime) -> DateTime<FixedOffset> {
        match self {
            Self::Utc => Utc.from_utc_datetime(&local).fixed_offset(),
            Self::Fixed(offset) => at_offset(local, *offset),
            Self::Named(tz) => tz.from_local_datetime(&local).earliest().map_or_else(
                || at_offset(local, tz.offset_from_utc_datetime(&local).fix()),
                |dt| dt.fixed_offset(),
            ),
        }
    }
}

/// Interpret `local` as wall-clock time at `offset`.
#[must_use]
pub fn at_offset(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None if rest.len() == 4 => {
            let (h, m) = rest.split_at_checked(2)?;
            (h.parse().ok()?, m.parse().ok()?)
        }
        None => (rest.parse().ok()?, 0),
    };
    if !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl FromStr for ReferenceZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
            return Ok(Self::Utc);
        }
        let offset_part = raw
            .strip_prefix("UTC")
            .or_else(|| raw.strip_prefix("utc"))
            .unwrap_or(raw);
        if let Some(offset) = parse_offset(offset_part) {
            return Ok(Self::Fixed(offset));
        }
        raw.parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| format!("unknown time zone '{raw}'"))
    }
}

impl TryFrom<String> for ReferenceZone {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReferenceZone> for String {
    fn from(zone: ReferenceZone) -> Self {
        zone.to_string()
    }
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => f.write_str("UTC"),
            Self::Fixed(offset) => write!(f, "{offset}"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

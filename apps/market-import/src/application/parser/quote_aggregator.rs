//! Merges consecutive depth rows into snapshots.

use crate::domain::messages::{QuoteLevel, QuoteSnapshot};

/// Accumulates levels while the (time, security) key stays the same.
///
/// Grouping is contiguous: a key that reappears after another key starts a
/// new snapshot.
#[derive(Debug, Default)]
pub struct QuoteAggregator {
    current: Option<QuoteSnapshot>,
}

impl QuoteAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a level; returns the previous snapshot when the key changes.
    pub fn push(&mut self, level: QuoteLevel) -> Option<QuoteSnapshot> {
        if let Some(snapshot) = self.current.as_mut().filter(|s| s.matches(&level)) {
            snapshot.push(level);
            return None;
        }

        let mut next = QuoteSnapshot::new(level.security_id.clone(), level.server_time);
        next.push(level);
        self.current.replace(next)
    }

    /// Snapshot in progress, if any. Call at end of input.
    pub fn finish(&mut self) -> Option<QuoteSnapshot> {
        self.current.take()
    }

    /// Drop the snapshot in progress.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset};
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::shared::{SecurityId, Side};

    fn at(secs: i64) -> DateTime<FixedOffset> {
        DateTime::from_timestamp(secs, 0).unwrap().fixed_offset()
    }

    fn level(code: &str, secs: i64, side: Side, price: i64) -> QuoteLevel {
        QuoteLevel {
            security_id: SecurityId::new(code, "TQBR"),
            server_time: at(secs),
            price: Decimal::from(price),
            volume: Decimal::ONE,
            side: Some(side),
            ..QuoteLevel::default()
        }
    }

    #[test]
    fn groups_levels_with_equal_key() {
        let mut aggregator = QuoteAggregator::new();
        assert!(aggregator.push(level("SBER", 1, Side::Buy, 100)).is_none());
        assert!(aggregator.push(level("SBER", 1, Side::Sell, 101)).is_none());
        assert!(aggregator.push(level("SBER", 1, Side::Buy, 99)).is_none());

        let first = aggregator.push(level("SBER", 2, Side::Buy, 100)).unwrap();
        assert_eq!(first.server_time, at(1));
        assert_eq!(
            first.bids.iter().map(|e| e.price).collect::<Vec<_>>(),
            vec![Decimal::from(100), Decimal::from(99)]
        );
        assert_eq!(first.asks.len(), 1);
        assert!(!first.has_positions);

        let last = aggregator.finish().unwrap();
        assert_eq!(last.server_time, at(2));
        assert!(aggregator.finish().is_none());
    }

    #[test]
    fn security_change_starts_new_snapshot() {
        let mut aggregator = QuoteAggregator::new();
        aggregator.push(level("SBER", 1, Side::Buy, 100));
        let emitted = aggregator.push(level("GAZP", 1, Side::Buy, 100)).unwrap();
        assert_eq!(emitted.security_id.security_code, "SBER");
    }

    #[test]
    fn positions_mark_snapshot() {
        let mut aggregator = QuoteAggregator::new();
        let mut positioned = level("SBER", 1, Side::Sell, 101);
        positioned.start_position = Some(0);
        aggregator.push(level("SBER", 1, Side::Buy, 100));
        aggregator.push(positioned);
        assert!(aggregator.finish().unwrap().has_positions);
    }

    #[test]
    fn clear_discards_pending_snapshot() {
        let mut aggregator = QuoteAggregator::new();
        aggregator.push(level("SBER", 1, Side::Buy, 100));
        aggregator.clear();
        assert!(aggregator.finish().is_none());
    }
}

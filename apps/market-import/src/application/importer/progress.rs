//! Whole-percentage progress over a stream of known length.

/// Turns byte positions into whole percentages, reporting each only once.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    length: Option<u64>,
    last: Option<u8>,
}

impl ProgressTracker {
    /// Tracker for a stream of `length` bytes; `None` disables reporting.
    #[must_use]
    pub const fn new(length: Option<u64>) -> Self {
        Self { length, last: None }
    }

    /// Percentage to report for `position`, if it is a new whole percentage.
    pub fn update(&mut self, position: u64) -> Option<u8> {
        let length = self.length.filter(|l| *l > 0)?;
        let percent = (u128::from(position.min(length)) * 100 / u128::from(length)) as u8;
        if self.last.is_some_and(|last| percent <= last) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }

    /// Final 100% when progress was reported but never reached it.
    pub fn finish(&mut self) -> Option<u8> {
        match self.last {
            Some(last) if last < 100 => {
                self.last = Some(100);
                Some(100)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn reports_each_percentage_once() {
        let mut tracker = ProgressTracker::new(Some(200));
        assert_eq!(tracker.update(1), Some(0));
        assert_eq!(tracker.update(1), None);
        assert_eq!(tracker.update(2), Some(1));
        assert_eq!(tracker.update(3), None);
        assert_eq!(tracker.update(100), Some(50));
        assert_eq!(tracker.finish(), Some(100));
        assert_eq!(tracker.finish(), None);
    }

    #[test]
    fn unknown_length_reports_nothing() {
        let mut tracker = ProgressTracker::new(None);
        assert_eq!(tracker.update(10), None);
        assert_eq!(tracker.finish(), None);
    }

    #[test]
    fn full_read_does_not_repeat_final() {
        let mut tracker = ProgressTracker::new(Some(10));
        assert_eq!(tracker.update(10), Some(100));
        assert_eq!(tracker.finish(), None);
    }

    proptest! {
        #[test]
        fn reports_are_strictly_increasing(length in 1u64..10_000, steps in prop::collection::vec(0u64..10_000, 1..50)) {
            let mut tracker = ProgressTracker::new(Some(length));
            let mut positions = steps;
            positions.sort_unstable();
            let mut reported: Vec<u8> = positions.into_iter().filter_map(|p| tracker.update(p)).collect();
            reported.extend(tracker.finish());
            prop_assert!(reported.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(reported.iter().all(|p| *p <= 100));
            prop_assert_eq!(reported.last().copied(), Some(100));
        }
    }
}

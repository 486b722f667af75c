//! OHLC candles.

use chrono::{DateTime, FixedOffset, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{CandleState, SecurityId};

/// Time-frame candle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Instrument.
    pub security_id: SecurityId,
    /// Bar open time.
    pub open_time: DateTime<FixedOffset>,
    /// Bar close time.
    pub close_time: Option<DateTime<FixedOffset>>,
    /// Time frame length in seconds.
    pub time_frame_secs: Option<i64>,
    /// Open price.
    pub open_price: Decimal,
    /// High price.
    pub high_price: Decimal,
    /// Low price.
    pub low_price: Decimal,
    /// Close price.
    pub close_price: Decimal,
    /// Traded volume.
    pub total_volume: Decimal,
    /// Open interest.
    pub open_interest: Option<Decimal>,
    /// Up-tick count.
    pub up_ticks: Option<i32>,
    /// Down-tick count.
    pub down_ticks: Option<i32>,
    /// Tick count.
    pub total_ticks: Option<i32>,
    /// Lifecycle state.
    pub state: CandleState,
}

impl Candle {
    /// Mark finished, apply the time frame and derive a missing close time.
    pub fn finish(&mut self, time_frame: Option<TimeDelta>) {
        self.state = CandleState::Finished;
        if let Some(tf) = time_frame {
            self.time_frame_secs = Some(tf.num_seconds());
            if self.close_time.is_none() {
                self.close_time = self.open_time.checked_add_signed(tf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_derives_close_time() {
        let mut candle = Candle::default();
        candle.finish(Some(TimeDelta::minutes(5)));

        assert_eq!(candle.state, CandleState::Finished);
        assert_eq!(candle.time_frame_secs, Some(300));
        assert_eq!(
            candle.close_time,
            Some(candle.open_time + TimeDelta::minutes(5))
        );
    }

    #[test]
    fn finish_keeps_explicit_close_time() {
        let explicit = DateTime::<FixedOffset>::default() + TimeDelta::minutes(1);
        let mut candle = Candle {
            close_time: Some(explicit),
            ..Candle::default()
        };
        candle.finish(Some(TimeDelta::minutes(5)));
        assert_eq!(candle.close_time, Some(explicit));

        let mut no_frame = Candle::default();
        no_frame.finish(None);
        assert_eq!(no_frame.state, CandleState::Finished);
        assert!(no_frame.close_time.is_none());
    }
}

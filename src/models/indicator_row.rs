use serde::Serialize;

use crate::models::Candle;

/// Reference level for "average" volatility.
pub const BASELINE: f64 = 1.0;

/// One output row of the Candle Widening Ratio.
///
/// `ratio` is `None` when the trailing average range is zero, which happens
/// only when every bar in the window has `high == low`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub timestamp: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub current_range: f64,
    pub average_range: f64,
    #[serde(rename = "cwr")]
    pub ratio: Option<f64>,
    pub baseline: f64,
}

impl IndicatorRow {
    pub fn new(candle: &Candle, current_range: f64, average_range: f64) -> Self {
        let ratio = if average_range == 0.0 {
            None
        } else {
            Some(current_range / average_range)
        };

        Self {
            timestamp: candle.timestamp,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            current_range,
            average_range,
            ratio,
            baseline: BASELINE,
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.ratio.is_none()
    }

    pub fn is_widening(&self) -> bool {
        self.ratio.is_some_and(|r| r > BASELINE)
    }
}

use std::borrow::Borrow;
use std::collections::VecDeque;

use log::trace;

use crate::error::{Error, InvalidBarError};
use crate::models::{Candle, IndicatorRow};

pub const DEFAULT_LENGTH: usize = 20;

/// Parameters of the Candle Widening Ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRatioParams {
    length: usize,
}

impl RangeRatioParams {
    pub fn new(length: usize) -> Result<Self, Error> {
        if length == 0 {
            return Err(Error::InvalidLength(length));
        }
        Ok(Self { length })
    }

    /// Number of trailing bars averaged into `average_range`.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RangeRatioParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
        }
    }
}

/// Streaming Candle Widening Ratio.
///
/// Keeps the ranges of the last `length` accepted bars and a running sum of
/// them. Until the window fills, the average is taken over the bars seen so
/// far. A bar that fails validation is reported and leaves the state exactly
/// as it was.
#[derive(Debug, Clone)]
pub struct RangeRatioCalculator {
    params: RangeRatioParams,
    window: VecDeque<f64>,
    sum: f64,
    // count of non-zero ranges in `window`
    nonzero: usize,
    evictions: usize,
    seen: usize,
    last_timestamp: Option<u64>,
}

impl RangeRatioCalculator {
    pub fn new(params: RangeRatioParams) -> Self {
        Self {
            params,
            window: VecDeque::with_capacity(params.length() + 1),
            sum: 0.0,
            nonzero: 0,
            evictions: 0,
            seen: 0,
            last_timestamp: None,
        }
    }

    /// Batch form: computes every row, stopping at the first invalid bar.
    pub fn compute(
        candles: &[Candle],
        params: RangeRatioParams,
    ) -> Result<Vec<IndicatorRow>, InvalidBarError> {
        candles.iter().range_ratio(params).collect()
    }

    pub fn params(&self) -> RangeRatioParams {
        self.params
    }

    /// Number of ranges currently held in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
        self.nonzero = 0;
        self.evictions = 0;
        self.seen = 0;
        self.last_timestamp = None;
    }

    pub fn update(&mut self, candle: &Candle) -> Result<IndicatorRow, InvalidBarError> {
        let checked = self.validate(candle);
        self.seen += 1;
        checked?;

        let current_range = candle.range();
        self.push(current_range);
        self.last_timestamp = Some(candle.timestamp);

        let average_range = self.average();
        trace!(
            "[cwr] bar {} at {}: range={} average={} window={}",
            self.seen - 1,
            candle.timestamp,
            current_range,
            average_range,
            self.window.len()
        );

        Ok(IndicatorRow::new(candle, current_range, average_range))
    }

    fn validate(&self, candle: &Candle) -> Result<(), InvalidBarError> {
        let index = self.seen;
        let fields = [
            ("open", candle.open),
            ("high", candle.high),
            ("low", candle.low),
            ("close", candle.close),
            ("volume", candle.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(InvalidBarError::NonFinite {
                    index,
                    timestamp: candle.timestamp,
                    field,
                });
            }
        }

        if let Some(previous) = self.last_timestamp {
            if candle.timestamp <= previous {
                return Err(InvalidBarError::NonMonotonicTimestamp {
                    index,
                    timestamp: candle.timestamp,
                    previous,
                });
            }
        }

        if candle.high < candle.low {
            return Err(InvalidBarError::HighBelowLow {
                index,
                timestamp: candle.timestamp,
                high: candle.high,
                low: candle.low,
            });
        }

        // finite high and low can still overflow, e.g. f64::MAX - -f64::MAX
        if !candle.range().is_finite() {
            return Err(InvalidBarError::NonFinite {
                index,
                timestamp: candle.timestamp,
                field: "range",
            });
        }

        Ok(())
    }

    fn push(&mut self, range: f64) {
        self.window.push_back(range);
        self.sum += range;
        if range != 0.0 {
            self.nonzero += 1;
        }

        if self.window.len() > self.params.length() {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
                if oldest != 0.0 {
                    self.nonzero -= 1;
                }
            }
            self.evictions += 1;
        }

        if self.nonzero == 0 {
            self.sum = 0.0;
        } else if self.evictions >= self.params.length()
            || self.sum <= 0.0
            || !self.sum.is_finite()
        {
            // re-sum to drop the error accumulated by subtracting evicted ranges
            self.sum = self.window.iter().sum();
            self.evictions = 0;
        }
    }

    fn average(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.sum / self.window.len() as f64
    }
}

/// Lazy adapter yielding one result per input bar, in input order.
pub struct RangeRatioIter<I> {
    inner: I,
    calculator: RangeRatioCalculator,
}

impl<I> RangeRatioIter<I> {
    pub fn new(inner: I, params: RangeRatioParams) -> Self {
        Self {
            inner,
            calculator: RangeRatioCalculator::new(params),
        }
    }
}

impl<I, C> Iterator for RangeRatioIter<I>
where
    I: Iterator<Item = C>,
    C: Borrow<Candle>,
{
    type Item = Result<IndicatorRow, InvalidBarError>;

    fn next(&mut self) -> Option<Self::Item> {
        let candle = self.inner.next()?;
        Some(self.calculator.update(candle.borrow()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub trait RangeRatioExt: Iterator + Sized {
    fn range_ratio(self, params: RangeRatioParams) -> RangeRatioIter<Self> {
        RangeRatioIter::new(self, params)
    }
}

impl<I, C> RangeRatioExt for I
where
    I: Iterator<Item = C>,
    C: Borrow<Candle>,
{
}

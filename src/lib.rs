pub mod cli;
pub mod error;
pub mod helpers;
pub mod models;
pub mod services;
pub mod statistics;

pub use error::{Error, InvalidBarError, Result};
pub use models::{Candle, IndicatorRow, BASELINE};
pub use statistics::{RangeRatioCalculator, RangeRatioExt, RangeRatioParams, RatioSummary};

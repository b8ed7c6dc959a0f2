pub mod range_ratio;
pub mod summary;
pub use range_ratio::{
    RangeRatioCalculator, RangeRatioExt, RangeRatioIter, RangeRatioParams, DEFAULT_LENGTH,
};
pub use summary::RatioSummary;

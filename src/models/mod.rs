pub mod candle;
pub mod indicator_row;
pub use candle::Candle;
pub use indicator_row::{IndicatorRow, BASELINE};

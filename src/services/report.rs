use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::IndicatorRow;
use crate::statistics::{RangeRatioParams, RatioSummary};

const INDICATOR: &str = "Candle Widening Ratio (CWR)";
const DESCRIPTION: &str =
    "Measures how the current candle's range compares to the average range of recent candles";
const CALCULATION: &str =
    "current_range / average_range where current_range = high - low and average_range is the simple average of the last `length` ranges";

/// JSON document describing a computed CWR series.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub indicator: &'static str,
    pub description: &'static str,
    pub calculation: &'static str,
    pub length: usize,
    pub data_points: usize,
    pub summary: RatioSummary,
    pub results: &'a [IndicatorRow],
}

impl<'a> Report<'a> {
    pub fn new(params: RangeRatioParams, rows: &'a [IndicatorRow]) -> Self {
        Self {
            indicator: INDICATOR,
            description: DESCRIPTION,
            calculation: CALCULATION,
            length: params.length(),
            data_points: rows.len(),
            summary: RatioSummary::from_rows(rows),
            results: rows,
        }
    }

    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        io::Write::flush(&mut writer)?;
        Ok(())
    }
}

use clap::ValueEnum;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Candle, IndicatorRow};
use crate::statistics::RangeRatioCalculator;

/// What to do with a bar that cannot be read or fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InvalidBarPolicy {
    /// Stop at the first bad bar and return its error
    #[default]
    Abort,
    /// Log a warning, drop the bar and keep going
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows: usize,
    pub skipped: usize,
}

/// Feeds `bars` through `calculator`, handing every produced row to `sink`.
///
/// Sink errors always abort; the policy only covers unreadable and invalid
/// bars.
pub fn run<I, F>(
    bars: I,
    calculator: &mut RangeRatioCalculator,
    policy: InvalidBarPolicy,
    mut sink: F,
) -> Result<RunStats>
where
    I: IntoIterator<Item = Result<Candle>>,
    F: FnMut(&IndicatorRow) -> Result<()>,
{
    let mut stats = RunStats::default();

    for bar in bars {
        let row = bar.and_then(|candle| calculator.update(&candle).map_err(Error::from));
        match row {
            Ok(row) => {
                sink(&row)?;
                stats.rows += 1;
            }
            Err(e) if policy == InvalidBarPolicy::Skip => {
                warn!("[cwr] Skipping bar: {}", e);
                stats.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        "[cwr] Processed {} rows, skipped {} bars",
        stats.rows, stats.skipped
    );
    Ok(stats)
}

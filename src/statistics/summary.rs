use std::fmt;

use serde::Serialize;

use crate::models::IndicatorRow;

/// Aggregate view over a computed CWR series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatioSummary {
    pub total: usize,
    pub defined: usize,
    pub undefined: usize,
    pub widening: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(skip)]
    sum: f64,
}

impl RatioSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: &[IndicatorRow]) -> Self {
        let mut summary = Self::new();
        for row in rows {
            summary.push(row);
        }
        summary
    }

    pub fn push(&mut self, row: &IndicatorRow) {
        self.total += 1;

        let Some(ratio) = row.ratio else {
            self.undefined += 1;
            return;
        };

        self.defined += 1;
        if row.is_widening() {
            self.widening += 1;
        }
        self.sum += ratio;
        self.mean = Some(self.sum / self.defined as f64);
        self.min = Some(self.min.map_or(ratio, |m| m.min(ratio)));
        self.max = Some(self.max.map_or(ratio, |m| m.max(ratio)));
    }
}

impl fmt::Display for RatioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v));
        let widening_pct = if self.defined > 0 {
            self.widening as f64 / self.defined as f64 * 100.0
        } else {
            0.0
        };

        write!(
            f,
            "CWR Statistics\n\
            Total candles:  {}\n\
            Valid CWR:      {}\n\
            Undefined CWR:  {}\n\
            Average CWR:    {}\n\
            Min CWR:        {}\n\
            Max CWR:        {}\n\
            Above baseline: {} ({:.1}%)\n",
            self.total,
            self.defined,
            self.undefined,
            fmt_opt(self.mean),
            fmt_opt(self.min),
            fmt_opt(self.max),
            self.widening,
            widening_pct,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use approx::assert_relative_eq;

    fn row(timestamp: u64, current: f64, average: f64) -> IndicatorRow {
        let candle = Candle::new(timestamp, 1.0, 1.0 + current, 1.0, 1.0, 0.0);
        IndicatorRow::new(&candle, current, average)
    }

    #[test]
    fn test_summary_counts() {
        let rows = vec![
            row(0, 0.0, 0.0),
            row(60, 1.0, 1.0),
            row(120, 3.0, 2.0),
            row(180, 1.0, 2.0),
        ];
        let summary = RatioSummary::from_rows(&rows);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.defined, 3);
        assert_eq!(summary.undefined, 1);
        assert_eq!(summary.widening, 1);
        assert_relative_eq!(summary.mean.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(summary.min, Some(0.5));
        assert_eq!(summary.max, Some(1.5));
    }

    #[test]
    fn test_empty_summary() {
        let summary = RatioSummary::from_rows(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean, None);
        let text = summary.to_string();
        assert!(text.contains("Average CWR:    n/a"));
        assert!(text.contains("Above baseline: 0 (0.0%)"));
    }

    #[test]
    fn test_display_formats_values() {
        let summary = RatioSummary::from_rows(&[row(0, 2.0, 1.0)]);
        let text = summary.to_string();

        assert!(text.contains("Total candles:  1"));
        assert!(text.contains("Max CWR:        2.0000"));
    }
}

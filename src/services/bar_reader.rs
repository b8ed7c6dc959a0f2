use std::fs::File;
use std::io;
use std::path::Path;

use csv::{StringRecord, StringRecordsIntoIter};
use log::debug;

use crate::error::{Error, Result};
use crate::helpers::parse_timestamp;
use crate::models::Candle;

const TIME_HEADERS: [&str; 4] = ["time", "timestamp", "date", "datetime"];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn detect(headers: &[String]) -> Result<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(Error::MissingColumn(name))
        };

        let timestamp = headers
            .iter()
            .position(|h| TIME_HEADERS.contains(&h.as_str()))
            .or_else(|| headers.iter().position(|h| h.contains("timestamp")))
            .ok_or(Error::MissingColumn("time"))?;

        Ok(Self {
            timestamp,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: headers.iter().position(|h| h == "volume"),
        })
    }
}

/// Lazy OHLCV source over a CSV file with a header row.
///
/// Columns are located by (case-insensitive) name, so extra columns and any
/// column order are accepted. A missing `volume` column reads as 0.0.
pub struct BarReader<R: io::Read> {
    records: StringRecordsIntoIter<R>,
    columns: Columns,
}

impl BarReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        debug!("Reading bars from {}", path.as_ref().display());
        Self::new(file)
    }
}

impl<R: io::Read> BarReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let columns = Columns::detect(&headers)?;
        debug!("Detected columns {:?} from headers {:?}", columns, headers);

        Ok(Self {
            records: reader.into_records(),
            columns,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<Candle> {
        let line = record.position().map_or(0, |p| p.line());

        let raw_time = field(record, line, self.columns.timestamp, "time")?;
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| Error::ParseField {
            line,
            field: "time",
            value: raw_time.to_string(),
        })?;

        let volume = match self.columns.volume {
            Some(idx) => number(record, line, idx, "volume")?,
            None => 0.0,
        };

        Ok(Candle {
            timestamp,
            open: number(record, line, self.columns.open, "open")?,
            high: number(record, line, self.columns.high, "high")?,
            low: number(record, line, self.columns.low, "low")?,
            close: number(record, line, self.columns.close, "close")?,
            volume,
        })
    }
}

fn field<'r>(
    record: &'r StringRecord,
    line: u64,
    idx: usize,
    name: &'static str,
) -> Result<&'r str> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingField { line, field: name }),
    }
}

fn number(record: &StringRecord, line: u64, idx: usize, name: &'static str) -> Result<f64> {
    let value = field(record, line, idx, name)?;
    value.parse::<f64>().map_err(|_| Error::ParseField {
        line,
        field: name,
        value: value.to_string(),
    })
}

impl<R: io::Read> Iterator for BarReader<R> {
    type Item = Result<Candle>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        Some(self.parse(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<Vec<Candle>> {
        BarReader::new(input.as_bytes())?.collect()
    }

    #[test]
    fn test_reads_standard_layout() {
        let bars = read(
            "time,open,high,low,close,volume\n\
             60,1.0,2.0,0.5,1.5,10\n\
             120,1.5,2.5,1.0,2.0,12.5\n",
        )
        .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0], Candle::new(60, 1.0, 2.0, 0.5, 1.5, 10.0));
        assert_eq!(bars[1].volume, 12.5);
    }

    #[test]
    fn test_reads_reordered_headers_case_insensitive() {
        let bars = read(
            "Close,Low,High,Open,Open Timestamp,Symbol\n\
             1.5, 0.5, 2.0, 1.0, 2024-01-01 00:00:00, BTC\n",
        )
        .unwrap();

        assert_eq!(bars[0], Candle::new(1_704_067_200, 1.0, 2.0, 0.5, 1.5, 0.0));
    }

    #[test]
    fn test_missing_column() {
        let err = read("time,open,high,close\n1,1,1,1\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn("low")));

        let err = read("open,high,low,close\n1,1,1,1\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn("time")));
    }

    #[test]
    fn test_missing_and_bad_fields_report_line() {
        let input = "time,open,high,low,close\n\
                     60,1,2,1,1\n\
                     120,1,,1,1\n\
                     180,1,x,1,1\n\
                     never,1,2,1,1\n\
                     240,1,2\n";
        let results: Vec<Result<Candle>> = BarReader::new(input.as_bytes()).unwrap().collect();

        assert_eq!(results.len(), 5);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(Error::MissingField { line: 3, field: "high" })
        ));
        assert!(matches!(
            &results[2],
            Err(Error::ParseField { line: 4, field: "high", value }) if value == "x"
        ));
        assert!(matches!(
            results[3],
            Err(Error::ParseField { line: 5, field: "time", .. })
        ));
        assert!(matches!(
            results[4],
            Err(Error::MissingField { line: 6, field: "low" })
        ));
    }
}

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::helpers::{format_timestamp, TimeFormat};
use crate::models::IndicatorRow;

pub const COLUMNS: [&str; 10] = [
    "time",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "cwr",
    "baseline",
    "current_range",
    "average_range",
];

// Field order must follow COLUMNS.
#[derive(Serialize)]
struct CsvRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    cwr: f64,
    baseline: f64,
    current_range: f64,
    average_range: f64,
}

impl CsvRow {
    fn new(row: &IndicatorRow, time_format: TimeFormat) -> Self {
        Self {
            time: format_timestamp(row.timestamp, time_format),
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            cwr: row.ratio.unwrap_or(f64::NAN),
            baseline: row.baseline,
            current_range: row.current_range,
            average_range: row.average_range,
        }
    }
}

/// CSV sink for indicator rows. The header is written on creation, so an
/// empty series still produces a valid file.
///
/// When created with [`RowWriter::from_path`] the rows go to a `.partial`
/// sibling of the target, which [`RowWriter::finish`] renames into place. A
/// failed run therefore never leaves a truncated file under the target name.
pub struct RowWriter<W: io::Write> {
    writer: csv::Writer<W>,
    time_format: TimeFormat,
    rows: usize,
    staged: Option<Staged>,
}

#[derive(Debug, Clone)]
struct Staged {
    partial: PathBuf,
    target: PathBuf,
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    target.with_file_name(name)
}

impl RowWriter<File> {
    pub fn from_path<P: AsRef<Path>>(path: P, time_format: TimeFormat) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let partial = partial_path(&target);
        let file = File::create(&partial)?;
        debug!("Staging rows in {}", partial.display());

        let mut writer = Self::new(file, time_format)?;
        writer.staged = Some(Staged { partial, target });
        Ok(writer)
    }
}

impl<W: io::Write> RowWriter<W> {
    pub fn new(inner: W, time_format: TimeFormat) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(COLUMNS)?;

        Ok(Self {
            writer,
            time_format,
            rows: 0,
            staged: None,
        })
    }

    pub fn write(&mut self, row: &IndicatorRow) -> Result<()> {
        self.writer.serialize(CsvRow::new(row, self.time_format))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Where rows are written until `finish`, if staged.
    pub fn staging_path(&self) -> Option<&Path> {
        self.staged.as_ref().map(|s| s.partial.as_path())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and, for a staged file, moves it onto the target path.
    pub fn finish(self) -> Result<()> {
        let staged = self.staged.clone();
        drop(self.into_inner()?);
        if let Some(staged) = staged {
            fs::rename(&staged.partial, &staged.target)?;
            debug!("Moved {} to {}", staged.partial.display(), staged.target.display());
        }
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

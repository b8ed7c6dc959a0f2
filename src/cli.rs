use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::helpers::TimeFormat;
use crate::services::InvalidBarPolicy;
use crate::statistics::DEFAULT_LENGTH;

/// Computes the Candle Widening Ratio over an OHLCV CSV file.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// OHLCV CSV file with a header row
    pub input: PathBuf,

    /// Output CSV path [default: <input stem>_cwr.csv next to the input]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of trailing bars in the average range
    #[arg(short, long, env = "CWR_LENGTH", default_value_t = DEFAULT_LENGTH, value_parser = parse_length)]
    pub length: usize,

    /// Also write a JSON report with summary statistics
    #[arg(long)]
    pub json: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InvalidBarPolicy::Abort)]
    pub on_invalid: InvalidBarPolicy,

    #[arg(long, value_enum, default_value_t = TimeFormat::Iso)]
    pub time_format: TimeFormat,
}

impl Args {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.input))
    }
}

pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bars".to_string());
    input.with_file_name(format!("{}_cwr.csv", stem))
}

pub fn parse_length(s: &str) -> Result<usize, String> {
    let length = usize::from_str(s.trim()).map_err(|e| e.to_string())?;
    if length == 0 {
        return Err("Length must be at least 1".into());
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("20"), Ok(20));
        assert_eq!(parse_length(" 3 "), Ok(3));
        assert!(parse_length("0").is_err());
        assert!(parse_length("-1").is_err());
        assert!(parse_length("abc").is_err());
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("data/btc_1d.csv")),
            PathBuf::from("data/btc_1d_cwr.csv")
        );
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["cwr", "bars.csv"]).unwrap();

        assert_eq!(args.input, PathBuf::from("bars.csv"));
        assert_eq!(args.on_invalid, InvalidBarPolicy::Abort);
        assert_eq!(args.time_format, TimeFormat::Iso);
        assert_eq!(args.output_path(), PathBuf::from("bars_cwr.csv"));
        assert!(args.json.is_none());
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "cwr",
            "bars.csv",
            "-l",
            "14",
            "-o",
            "out.csv",
            "--json",
            "out.json",
            "--on-invalid",
            "skip",
            "--time-format",
            "unix",
        ])
        .unwrap();

        assert_eq!(args.length, 14);
        assert_eq!(args.output_path(), PathBuf::from("out.csv"));
        assert_eq!(args.json, Some(PathBuf::from("out.json")));
        assert_eq!(args.on_invalid, InvalidBarPolicy::Skip);
        assert_eq!(args.time_format, TimeFormat::Unix);

        assert!(Args::try_parse_from(["cwr", "bars.csv", "--length", "0"]).is_err());
    }
}

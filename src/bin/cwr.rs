use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use cwr::{
    cli::Args,
    services::{self, BarReader, Report, RowWriter},
    IndicatorRow, RangeRatioCalculator, RangeRatioParams, RatioSummary,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = RangeRatioParams::new(args.length)?;
    let output = args.output_path();

    info!(
        "Computing CWR over {} (length {}, on invalid: {:?})",
        args.input.display(),
        params.length(),
        args.on_invalid
    );

    let bars = BarReader::from_path(&args.input)
        .with_context(|| format!("Cannot open input {}", args.input.display()))?;
    let mut writer = RowWriter::from_path(&output, args.time_format)
        .with_context(|| format!("Cannot create output {}", output.display()))?;

    let mut calculator = RangeRatioCalculator::new(params);
    let mut summary = RatioSummary::new();
    // rows are only retained when a JSON report needs them
    let mut kept: Vec<IndicatorRow> = Vec::new();
    let keep_rows = args.json.is_some();

    let result = services::run(bars, &mut calculator, args.on_invalid, |row| {
        writer.write(row)?;
        summary.push(row);
        if keep_rows {
            kept.push(*row);
        }
        Ok(())
    });
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            if let Some(partial) = writer.staging_path() {
                warn!(
                    "Run aborted, {} holds the rows written so far, {} is left untouched",
                    partial.display(),
                    output.display()
                );
            }
            return Err(e).with_context(|| {
                format!("Failed to compute CWR for {}", args.input.display())
            });
        }
    };
    writer
        .finish()
        .with_context(|| format!("Cannot finalize output {}", output.display()))?;

    info!(
        "Wrote {} rows to {} ({} bars skipped)",
        stats.rows,
        output.display(),
        stats.skipped
    );

    if let Some(json_path) = &args.json {
        Report::new(params, &kept)
            .write_to_path(json_path)
            .with_context(|| format!("Cannot write report {}", json_path.display()))?;
        info!("Wrote JSON report to {}", json_path.display());
    }

    print!("{}", summary);
    println!("Results saved to: {}", output.display());
    if let Some(json_path) = &args.json {
        println!("Report saved to:  {}", json_path.display());
    }

    Ok(())
}

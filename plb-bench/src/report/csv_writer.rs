//! CSV results table
//!
//! One header row followed by one row per trial result, in the order the
//! results were produced. The target file is truncated and fully rewritten.

use crate::models::RunReport;
use plb_common::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column order of the results table
pub const CSV_HEADER: [&str; 7] = [
    "model",
    "prompt",
    "runtime_sec",
    "output",
    "tracks_parsed",
    "tracks_found",
    "check_results",
];

/// Write the report as CSV to any writer
pub fn write_report<W: Write>(report: &RunReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written explicitly so an empty report still produces a header
    csv_writer.write_record(CSV_HEADER)?;
    for result in report.results() {
        csv_writer.serialize(result)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the report to a CSV file, replacing any existing file
pub fn write_csv(report: &RunReport, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_report(report, BufWriter::new(file))
}

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};

use crate::runner::SummaryRow;

/// Append `row` to the CSV at `path`, writing the header only when the file is new.
///
/// Single writer assumed; concurrent appenders to one path may interleave.
pub fn append_csv(path: &Path, row: &SummaryRow) -> Result<()> {
    let write_header = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {} for append", path.display()))?;
    let mut w = csv::WriterBuilder::new().has_headers(write_header).from_writer(file);
    w.serialize(row)
        .with_context(|| format!("writing row to {}", path.display()))?;
    w.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// The row as 2-space indented JSON, as printed on stdout.
pub fn to_pretty_json(row: &SummaryRow) -> Result<String> {
    Ok(serde_json::to_string_pretty(row)?)
}

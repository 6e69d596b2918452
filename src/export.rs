//! CSV output for harvested records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::app::Result;
use crate::domain::Record;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "datafile.csv";

/// Write `records` with a header row in [`Record`] field order. Returns the
/// number of rows written.
pub fn write_csv<W: Write>(records: &[Record], writer: W) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(records.len())
}

/// Create (or truncate) `path` and write `records` into it.
pub fn write_csv_file<P: AsRef<Path>>(records: &[Record], path: P) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    let written = write_csv(records, file)?;
    tracing::info!("Wrote {} records to {}", written, path.as_ref().display());
    Ok(written)
}

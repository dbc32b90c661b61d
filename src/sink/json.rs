use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;

/// Writes the records as one pretty-printed JSON array.
pub fn write_array<R: Serialize>(path: &Path, records: &[R]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.write_all(b"\n")?;
    out.flush()?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

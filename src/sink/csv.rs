use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::Result;

/// Writes a header row plus one row per record. An empty slice writes nothing
/// and creates no file; the return value says whether a file was written.
pub fn write_all<R: Serialize>(path: &Path, records: &[R]) -> Result<bool> {
    if records.is_empty() {
        info!("No records to write, {} not created", path.display());
        return Ok(false);
    }
    write_to(File::create(path)?, records)?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(true)
}

pub fn write_to<W: Write, R: Serialize>(out: W, records: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_all<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Streams records to a CSV file as they are produced, flushing each row so
/// a run that dies midway still leaves everything seen so far on disk.
pub struct CsvAppender {
    writer: csv::Writer<File>,
    written: usize,
}

impl CsvAppender {
    pub fn create(path: &Path) -> Result<Self> {
        debug!("Opening {} for incremental writes", path.display());
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
            written: 0,
        })
    }

    pub fn append<R: Serialize>(&mut self, record: &R) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

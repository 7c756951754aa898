use super::TrialRecord;
use anyhow::Result;
use csv::Writer;
use std::fs::File;
use std::path::Path;

pub struct TrialLogger {
    writer: Writer<File>,
}

impl TrialLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_batch(&mut self, records: &[TrialRecord]) -> Result<()> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

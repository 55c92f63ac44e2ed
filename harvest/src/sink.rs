use crate::error::Result;
use crate::model::RepositoryRecord;
use derive_more::Constructor;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Destination of a finished harvest.
pub trait Sink {
    fn persist(&self, records: &[RepositoryRecord]) -> Result<()>;
}

/// Writes records as pretty printed JSON, replacing the file if it exists.
#[derive(Debug, Clone, Constructor)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Sink for JsonFileSink {
    fn persist(&self, records: &[RepositoryRecord]) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

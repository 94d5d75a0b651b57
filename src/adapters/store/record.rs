use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::config::RecordMode;
use crate::domain::Sample;
use crate::ports::SinkResult;

/// Delimited text record, reopened in append mode on every write
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
    mode: RecordMode,
}

impl RecordFile {
    /// Create or truncate the record and write the header row
    pub fn create(
        path: impl Into<PathBuf>,
        columns: &[&str],
        mode: RecordMode,
    ) -> SinkResult<Self> {
        let path = path.into();
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(columns)?;
        writer.flush()?;

        Ok(Self { path, mode })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row for the current run.
    ///
    /// `Cumulative` writes every sample so far as one row of bracketed
    /// sequences, so the file grows quadratically with the run length.
    /// `Latest` writes only the newest sample as a flat row.
    pub fn append(&self, samples: &[Sample]) -> SinkResult<()> {
        let Some(latest) = samples.last() else {
            return Ok(());
        };

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);

        match self.mode {
            RecordMode::Cumulative => writer.write_record(samples.iter().map(Sample::to_sequence))?,
            RecordMode::Latest => writer.serialize(latest)?,
        }
        writer.flush()?;

        Ok(())
    }
}

mod record;
mod spreadsheet;

use std::path::PathBuf;

use tracing::info;

use crate::config::RecordMode;
use crate::domain::Sample;
use crate::ports::{RunSink, SinkError, SinkResult};

pub use record::RecordFile;
pub use spreadsheet::export_xlsx;

/// Flat per-run files under one output directory: `<stem>.txt` and `<stem>.xlsx`
pub struct FileSink {
    outdir: PathBuf,
    mode: RecordMode,
    record: Option<RecordFile>,
}

impl FileSink {
    pub fn new(outdir: impl Into<PathBuf>, mode: RecordMode) -> Self {
        Self {
            outdir: outdir.into(),
            mode,
            record: None,
        }
    }

    fn spreadsheet_path(&self) -> SinkResult<PathBuf> {
        let record = self.record.as_ref().ok_or(SinkError::NoRecord)?;
        Ok(record.path().with_extension("xlsx"))
    }
}

impl RunSink for FileSink {
    fn write_header(&mut self, stem: &str, columns: &[&str]) -> SinkResult<()> {
        let path = self.outdir.join(format!("{}.txt", stem));
        let record = RecordFile::create(&path, columns, self.mode)?;
        info!("Writing run record to {}", path.display());
        self.record = Some(record);
        Ok(())
    }

    fn append(&mut self, samples: &[Sample]) -> SinkResult<()> {
        self.record.as_ref().ok_or(SinkError::NoRecord)?.append(samples)
    }

    fn export(&mut self, samples: &[Sample]) -> SinkResult<()> {
        let path = self.spreadsheet_path()?;
        export_xlsx(&path, samples)?;
        info!("Exported {} samples to {}", samples.len(), path.display());
        Ok(())
    }
}

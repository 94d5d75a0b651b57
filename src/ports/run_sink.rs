use thiserror::Error;

use crate::domain::Sample;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record error: {0}")]
    Record(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("chart error: {0}")]
    Chart(String),

    #[error("no record opened, write the header first")]
    NoRecord,
}

pub type SinkResult<T> = Result<T, SinkError>;

/// Port for persisting a run while it grows and once it is finished
pub trait RunSink {
    /// Create (or truncate) the record named `stem` and write the column header
    fn write_header(&mut self, stem: &str, columns: &[&str]) -> SinkResult<()>;

    /// Append to the record; called once per tick with the whole run so far
    fn append(&mut self, samples: &[Sample]) -> SinkResult<()>;

    /// Export the finished run as a spreadsheet
    fn export(&mut self, samples: &[Sample]) -> SinkResult<()>;
}

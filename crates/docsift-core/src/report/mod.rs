//! Per-file and summary artifacts. Any write failure here means the output
//! destination is broken and ends the batch.

mod lease;
mod pii;

pub use lease::{LeaseReport, LeaseReportWriter, LEASE_SUMMARY_FILE};
pub use pii::{PiiReport, PiiReportWriter, PII_SUMMARY_FILE};

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineVariant;
use crate::record::ExtractionRecord;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot serialize report for {file}: {source}")]
    Json {
        file: String,
        source: serde_json::Error,
    },
    #[error("Cannot write summary {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

pub type ReportResult<T> = Result<T, ReportError>;

pub trait ReportWriter: Send + Sync {
    /// Writes the per-file artifact. `None` when the record produces none.
    fn write_record(&self, dir: &Path, record: &ExtractionRecord)
        -> ReportResult<Option<PathBuf>>;

    /// Writes the single tabular summary for the whole batch.
    fn write_summary(&self, dir: &Path, records: &[ExtractionRecord]) -> ReportResult<PathBuf>;
}

pub fn writer_for(variant: PipelineVariant) -> Box<dyn ReportWriter> {
    match variant {
        PipelineVariant::Lease => Box::new(LeaseReportWriter),
        PipelineVariant::Pii => Box::new(PiiReportWriter),
    }
}

/// Pretty-printed JSON at `<dir>/<stem>.json`, non-ASCII kept as is.
fn write_json(dir: &Path, record: &ExtractionRecord, value: &impl Serialize) -> ReportResult<PathBuf> {
    let path = dir.join(format!("{}.json", record.stem));
    let mut json = serde_json::to_string_pretty(value).map_err(|source| ReportError::Json {
        file: record.file_name.clone(),
        source,
    })?;
    json.push('\n');

    std::fs::write(&path, json).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn write_csv<R>(path: &Path, header: &[&str], rows: R) -> ReportResult<()>
where
    R: IntoIterator<Item = Vec<String>>,
{
    let csv_error = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let result = write_csv(&missing.join("summary.csv"), &["a"], Vec::new());
        assert!(matches!(result, Err(ReportError::Csv { .. })));
    }
}

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use super::{write_csv, write_json, ReportResult, ReportWriter};
use crate::acquire::AcquisitionMethod;
use crate::metrics::CountTable;
use crate::patterns::pii::COLUMNS;
use crate::record::{ExtractionRecord, RecordStatus};

pub const PII_SUMMARY_FILE: &str = "pii_results.csv";

/// Per-file PII artifact for a processed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiiReport<'a> {
    pub file_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<AcquisitionMethod>,
    pub counts: Option<&'a CountTable>,
    /// Category to sorted distinct values.
    pub values: Map<String, Value>,
}

impl<'a> PiiReport<'a> {
    /// `None` for skipped documents.
    pub fn from_record(record: &'a ExtractionRecord) -> Option<Self> {
        let RecordStatus::Processed { method } = record.status else {
            return None;
        };

        let mut values = Map::new();
        for (category, _) in COLUMNS {
            let unique = record
                .matches
                .unique_values(category)
                .into_iter()
                .map(|v| Value::String(v.to_string()))
                .collect();
            values.insert(category.name().to_string(), Value::Array(unique));
        }

        Some(Self {
            file_name: &record.file_name,
            method,
            counts: record.metrics.counts(),
            values,
        })
    }
}

/// One CSV row: the file name, then each category's distinct values
/// sorted and joined with `;`.
fn summary_row(record: &ExtractionRecord) -> Vec<String> {
    let mut row = Vec::with_capacity(COLUMNS.len() + 1);
    row.push(record.file_name.clone());
    for (category, _) in COLUMNS {
        let unique: Vec<&str> = record.matches.unique_values(category).into_iter().collect();
        row.push(unique.join(";"));
    }
    row
}

/// `pii_results.csv` for processed documents plus `<stem>.json` each.
/// Skipped documents produce nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PiiReportWriter;

impl ReportWriter for PiiReportWriter {
    fn write_record(
        &self,
        dir: &Path,
        record: &ExtractionRecord,
    ) -> ReportResult<Option<PathBuf>> {
        match PiiReport::from_record(record) {
            Some(report) => write_json(dir, record, &report).map(Some),
            None => Ok(None),
        }
    }

    fn write_summary(&self, dir: &Path, records: &[ExtractionRecord]) -> ReportResult<PathBuf> {
        let path = dir.join(PII_SUMMARY_FILE);

        let mut header = vec!["File Name"];
        header.extend(COLUMNS.iter().map(|(_, title)| *title));

        let rows = records
            .iter()
            .filter(|r| !r.is_skipped())
            .map(summary_row);
        write_csv(&path, &header, rows)?;
        Ok(path)
    }
}

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use super::{write_csv, write_json, ReportResult, ReportWriter};
use crate::metrics::ComplianceFlag;
use crate::patterns::lease::{CLAUSES, DATE, MONEY};
use crate::record::ExtractionRecord;

pub const LEASE_SUMMARY_FILE: &str = "summary.csv";

const SUMMARY_HEADER: [&str; 7] = [
    "file_name",
    "dates",
    "monetary_values",
    "parties",
    "clauses",
    "compliance_flags",
    "health_score",
];

/// Per-file lease artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaseReport<'a> {
    pub file_name: &'a str,
    /// ISO dates in calendar order.
    pub dates: Vec<&'a str>,
    pub monetary_values: Vec<&'a str>,
    pub parties: &'a [String],
    /// Clause key to distinct excerpts, in catalogue order.
    pub clauses: Map<String, Value>,
    pub compliance_flags: Vec<ComplianceFlag>,
    pub health_score: Option<u8>,
}

impl<'a> LeaseReport<'a> {
    pub fn from_record(record: &'a ExtractionRecord) -> Self {
        let matches = &record.matches;

        let mut clauses = Map::new();
        for (category, _) in CLAUSES {
            let excerpts: Vec<Value> = matches
                .contexts_in_order(category)
                .into_iter()
                .map(|e| Value::String(e.to_string()))
                .collect();
            clauses.insert(category.key().to_string(), Value::Array(excerpts));
        }

        let compliance = record.metrics.compliance();

        Self {
            file_name: &record.file_name,
            dates: matches.unique_values(DATE).into_iter().collect(),
            monetary_values: matches.values_in_order(MONEY),
            parties: &record.parties,
            clauses,
            compliance_flags: compliance.map(|c| c.compliance_flags.clone()).unwrap_or_default(),
            health_score: compliance.map(|c| c.health_score),
        }
    }

    /// One summary row; list and map cells hold compact JSON.
    fn summary_row(&self) -> Vec<String> {
        vec![
            self.file_name.to_string(),
            compact(&self.dates),
            compact(&self.monetary_values),
            compact(&self.parties),
            compact(&self.clauses),
            compact(&self.compliance_flags),
            self.health_score.map(|s| s.to_string()).unwrap_or_default(),
        ]
    }
}

fn compact(value: &impl Serialize) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// `<stem>.json` per document and `summary.csv` for the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaseReportWriter;

impl ReportWriter for LeaseReportWriter {
    fn write_record(
        &self,
        dir: &Path,
        record: &ExtractionRecord,
    ) -> ReportResult<Option<PathBuf>> {
        let report = LeaseReport::from_record(record);
        write_json(dir, record, &report).map(Some)
    }

    fn write_summary(&self, dir: &Path, records: &[ExtractionRecord]) -> ReportResult<PathBuf> {
        let path = dir.join(LEASE_SUMMARY_FILE);
        let rows = records
            .iter()
            .map(|r| LeaseReport::from_record(r).summary_row());
        write_csv(&path, &SUMMARY_HEADER, rows)?;
        Ok(path)
    }
}

pub mod acquire;
pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod patterns;
pub mod pipeline;
pub mod record;
pub mod report;

pub use acquire::{Acquisition, AcquisitionMethod, EmptyReason, LayeredAcquirer, TextAcquirer};
pub use batch::{BatchRunner, BatchSummary, CancelFlag, Progress};
pub use config::{ConfigError, OcrConfig, RunConfig};
pub use document::{Document, DocumentFormat, FormatClass};
pub use error::{Error, Result};
pub use extract::{Extraction, FieldExtractor, PartiesHeuristic};
pub use metrics::{
    CategoryCounts, Compliance, ComplianceFlag, CountTable, DerivedMetrics, LeaseCompliance,
    MetricsStrategy,
};
pub use patterns::{Catalogue, DateMatcher, KeywordMatcher, Matcher, RegexMatcher};
pub use pipeline::{AnalysisPipeline, PipelineVariant};
pub use record::{Category, ExtractionRecord, Match, MatchSet, RecordStatus};
pub use report::{ReportError, ReportWriter};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::acquire::TextAcquirer;
use crate::config::RunConfig;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::pipeline::{AnalysisPipeline, PipelineVariant};
use crate::record::ExtractionRecord;
use crate::report::{writer_for, ReportWriter};

/// Cooperative stop signal, checked between documents.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Started { total: usize },
    Processing { index: usize, total: usize, file_name: String },
    Cancelled { processed: usize },
    Complete { processed: usize },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { total } => write!(f, "Found {total} files"),
            Self::Processing { file_name, .. } => write!(f, "Processing: {file_name}"),
            Self::Cancelled { processed } => {
                write!(f, "Processing cancelled after {processed} files.")
            }
            Self::Complete { processed } => {
                write!(f, "Processing complete! {processed} files analyzed.")
            }
        }
    }
}

/// The records of one run with the parameters that produced them.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub variant: PipelineVariant,
    /// In enumeration order.
    pub records: Vec<ExtractionRecord>,
    pub summary_path: PathBuf,
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn processed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_skipped()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_skipped()).count()
    }
}

pub struct BatchRunner {
    config: RunConfig,
    pipeline: AnalysisPipeline,
    writer: Box<dyn ReportWriter>,
    cancel: CancelFlag,
}

impl BatchRunner {
    pub fn new(config: RunConfig, acquirer: Arc<dyn TextAcquirer>) -> Result<Self> {
        let pipeline = AnalysisPipeline::new(config.variant, acquirer)?;
        let writer = writer_for(config.variant);
        Ok(Self {
            config,
            pipeline,
            writer,
            cancel: CancelFlag::new(),
        })
    }

    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_writer(mut self, writer: Box<dyn ReportWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Processes every supported file of the input directory in name order.
    ///
    /// Per-document problems end up in the records. Only configuration and
    /// output errors are returned.
    pub async fn run(&self, mut on_progress: impl FnMut(&Progress) + Send) -> Result<BatchSummary> {
        self.config.prepare()?;
        let documents = enumerate(&self.config.input_dir).await?;
        let total = documents.len();

        tracing::info!(
            input = %self.config.input_dir.display(),
            output = %self.config.output_dir.display(),
            variant = %self.config.variant,
            total,
            "Starting batch"
        );
        on_progress(&Progress::Started { total });

        let mut records = Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, document) in documents.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            on_progress(&Progress::Processing {
                index,
                total,
                file_name: document.file_name(),
            });

            let record = self.pipeline.analyze_file(document).await;
            self.writer.write_record(&self.config.output_dir, &record)?;
            records.push(record);
        }

        let summary_path = self
            .writer
            .write_summary(&self.config.output_dir, &records)?;

        let processed = records.len();
        if cancelled {
            tracing::warn!(processed, total, "Batch cancelled");
            on_progress(&Progress::Cancelled { processed });
        } else {
            tracing::info!(processed, "Batch complete");
            on_progress(&Progress::Complete { processed });
        }

        Ok(BatchSummary {
            input_dir: self.config.input_dir.clone(),
            output_dir: self.config.output_dir.clone(),
            variant: self.config.variant,
            records,
            summary_path,
            cancelled,
        })
    }
}

/// Supported files directly inside `dir`, sorted by file name.
pub async fn enumerate(dir: &Path) -> Result<Vec<Document>> {
    let list_error = |source| Error::ListInput {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_error)?;
    let mut documents = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match Document::from_path(&path) {
            Some(document) => documents.push(document),
            None => tracing::debug!(file = %path.display(), "Ignoring unsupported file"),
        }
    }

    documents.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(documents)
}

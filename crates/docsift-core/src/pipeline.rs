use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::acquire::{Acquisition, AcquisitionMethod, TextAcquirer};
use crate::document::Document;
use crate::error::Result;
use crate::extract::{FieldExtractor, PartiesHeuristic};
use crate::metrics::{CategoryCounts, DerivedMetrics, LeaseCompliance, MetricsStrategy};
use crate::patterns::{self, Catalogue};
use crate::record::{ExtractionRecord, MatchSet, RecordStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
    /// Lease analysis: dates, amounts, parties, clauses, health score.
    Lease,
    /// PII scan: identity, contact and demographic mentions with counts.
    Pii,
}

impl PipelineVariant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lease => "lease",
            Self::Pii => "pii",
        }
    }

    pub fn catalogue(self) -> Result<Catalogue> {
        Ok(match self {
            Self::Lease => patterns::lease::catalogue()?,
            Self::Pii => patterns::pii::catalogue()?,
        })
    }

    pub fn extractor(self) -> Result<FieldExtractor> {
        let extractor = FieldExtractor::new(self.catalogue()?);
        Ok(match self {
            Self::Lease => extractor.with_parties(PartiesHeuristic::new()?),
            Self::Pii => extractor,
        })
    }

    pub fn strategy(self) -> Box<dyn MetricsStrategy> {
        match self {
            Self::Lease => Box::new(LeaseCompliance),
            Self::Pii => Box::new(CategoryCounts),
        }
    }

    /// Whether a document without text is skipped instead of being run
    /// through the matchers.
    pub const fn skips_empty(self) -> bool {
        matches!(self, Self::Pii)
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lease" => Ok(Self::Lease),
            "pii" => Ok(Self::Pii),
            other => Err(format!("unknown pipeline variant: {other}")),
        }
    }
}

/// Acquire, extract and derive for one document at a time.
pub struct AnalysisPipeline {
    variant: PipelineVariant,
    acquirer: Arc<dyn TextAcquirer>,
    extractor: FieldExtractor,
    strategy: Box<dyn MetricsStrategy>,
}

impl AnalysisPipeline {
    pub fn new(variant: PipelineVariant, acquirer: Arc<dyn TextAcquirer>) -> Result<Self> {
        let extractor = variant.extractor()?;
        let strategy = variant.strategy();
        tracing::debug!(
            %variant,
            catalogue = extractor.catalogue().name(),
            strategy = strategy.name(),
            "Pipeline ready"
        );

        Ok(Self {
            variant,
            acquirer,
            extractor,
            strategy,
        })
    }

    pub const fn variant(&self) -> PipelineVariant {
        self.variant
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    pub async fn analyze_file(&self, document: &Document) -> ExtractionRecord {
        let acquisition = self.acquirer.acquire(&document.path).await;
        self.analyze_acquisition(document, &acquisition)
    }

    pub fn analyze_acquisition(
        &self,
        document: &Document,
        acquisition: &Acquisition,
    ) -> ExtractionRecord {
        match acquisition {
            Acquisition::Empty { reason } if self.variant.skips_empty() => {
                tracing::info!(file = %document.file_name(), "Skipped: {reason}");
                ExtractionRecord {
                    file_name: document.file_name(),
                    stem: document.stem(),
                    status: RecordStatus::Skipped {
                        reason: reason.clone(),
                    },
                    matches: MatchSet::with_categories(self.extractor.categories()),
                    parties: Vec::new(),
                    metrics: DerivedMetrics::None,
                }
            }
            _ => self.analyze_text(document, acquisition.text(), acquisition.method()),
        }
    }

    /// Pure extraction and derivation on already acquired text.
    pub fn analyze_text(
        &self,
        document: &Document,
        text: &str,
        method: Option<AcquisitionMethod>,
    ) -> ExtractionRecord {
        let extraction = self.extractor.extract(text);
        let metrics = self.strategy.derive(&extraction);

        ExtractionRecord {
            file_name: document.file_name(),
            stem: document.stem(),
            status: RecordStatus::Processed { method },
            matches: extraction.matches,
            parties: extraction.parties,
            metrics,
        }
    }
}

//! Document-level outputs derived from extracted matches. Each pipeline
//! variant selects one strategy.

mod counts;
mod lease;

pub use counts::{CategoryCounts, CountTable};
pub use lease::{deposit_exceeds_rent, Compliance, ComplianceFlag, LeaseCompliance, Penalty};

use serde::Serialize;

use crate::extract::Extraction;

pub trait MetricsStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn derive(&self, extraction: &Extraction) -> DerivedMetrics;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DerivedMetrics {
    Compliance(Compliance),
    Counts(CountTable),
    /// Nothing derived, e.g. for a skipped document.
    None,
}

impl DerivedMetrics {
    pub const fn compliance(&self) -> Option<&Compliance> {
        match self {
            Self::Compliance(c) => Some(c),
            _ => None,
        }
    }

    pub const fn counts(&self) -> Option<&CountTable> {
        match self {
            Self::Counts(c) => Some(c),
            _ => None,
        }
    }
}

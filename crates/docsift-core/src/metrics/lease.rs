use std::fmt;

use serde::{Serialize, Serializer};

use super::{DerivedMetrics, MetricsStrategy};
use crate::extract::Extraction;
use crate::patterns::lease::{
    is_currency_tagged, parse_amount, DEPOSIT, GOVERNING_LAW, MONEY, RENT, TERMINATION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplianceFlag {
    DepositExceedsTwoMonthsRent,
    MissingGoverningLaw,
}

impl ComplianceFlag {
    pub const fn message(self) -> &'static str {
        match self {
            Self::DepositExceedsTwoMonthsRent => "Deposit exceeds 2 months rent",
            Self::MissingGoverningLaw => "Missing governing law clause",
        }
    }
}

impl fmt::Display for ComplianceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for ComplianceFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Independent health score deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    NoParties,
    NoRentClause,
    NoDepositClause,
    NoTerminationClause,
    ExcessiveDeposit,
    NoGoverningLaw,
}

impl Penalty {
    pub const ALL: [Self; 6] = [
        Self::NoParties,
        Self::NoRentClause,
        Self::NoDepositClause,
        Self::NoTerminationClause,
        Self::ExcessiveDeposit,
        Self::NoGoverningLaw,
    ];

    pub const fn points(self) -> u8 {
        match self {
            Self::NoParties | Self::ExcessiveDeposit => 15,
            Self::NoRentClause => 20,
            Self::NoDepositClause | Self::NoTerminationClause | Self::NoGoverningLaw => 10,
        }
    }

    fn applies(self, extraction: &Extraction, flags: &[ComplianceFlag]) -> bool {
        let matches = &extraction.matches;
        match self {
            Self::NoParties => extraction.parties.is_empty(),
            Self::NoRentClause => matches.is_empty(RENT),
            Self::NoDepositClause => matches.is_empty(DEPOSIT),
            Self::NoTerminationClause => matches.is_empty(TERMINATION),
            Self::ExcessiveDeposit => flags.contains(&ComplianceFlag::DepositExceedsTwoMonthsRent),
            Self::NoGoverningLaw => flags.contains(&ComplianceFlag::MissingGoverningLaw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compliance {
    pub compliance_flags: Vec<ComplianceFlag>,
    /// 0 to 100.
    pub health_score: u8,
}

/// Compliance flags and a 0-100 health score for lease documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaseCompliance;

impl LeaseCompliance {
    pub fn assess(extraction: &Extraction) -> Compliance {
        let mut flags = Vec::new();

        let amounts: Vec<&str> = extraction
            .matches
            .get(MONEY)
            .iter()
            .map(|m| m.value.as_str())
            .collect();
        if deposit_exceeds_rent(&amounts) {
            flags.push(ComplianceFlag::DepositExceedsTwoMonthsRent);
        }
        if extraction.matches.is_empty(GOVERNING_LAW) {
            flags.push(ComplianceFlag::MissingGoverningLaw);
        }

        let deducted: u8 = Penalty::ALL
            .iter()
            .filter(|p| p.applies(extraction, &flags))
            .map(|p| p.points())
            .sum();

        Compliance {
            compliance_flags: flags,
            health_score: 100u8.saturating_sub(deducted),
        }
    }
}

impl MetricsStrategy for LeaseCompliance {
    fn name(&self) -> &'static str {
        "lease-compliance"
    }

    fn derive(&self, extraction: &Extraction) -> DerivedMetrics {
        DerivedMetrics::Compliance(Self::assess(extraction))
    }
}

/// True when the largest currency-tagged amount exceeds twice the largest
/// amount overall. The overall maximum includes the tagged amounts.
pub fn deposit_exceeds_rent(values: &[&str]) -> bool {
    let tagged = values
        .iter()
        .filter(|v| is_currency_tagged(v))
        .filter_map(|v| parse_amount(v));
    let Some(max_deposit) = largest(tagged) else {
        return false;
    };

    largest(values.iter().filter_map(|v| parse_amount(v)))
        .is_some_and(|max_all| max_deposit > 2.0 * max_all)
}

fn largest(amounts: impl Iterator<Item = f64>) -> Option<f64> {
    amounts.reduce(f64::max)
}

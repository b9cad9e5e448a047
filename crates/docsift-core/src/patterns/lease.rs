//! Lease analysis catalogue: dates, monetary values and clause keywords.

use super::{Catalogue, DateMatcher, KeywordMatcher, Occurrences, RegexMatcher};
use crate::record::Category;

pub const DATE: Category = Category::new("date");
pub const MONEY: Category = Category::new("money");
pub const RENT: Category = Category::new("clause:rent");
pub const DEPOSIT: Category = Category::new("clause:deposit");
pub const TERMINATION: Category = Category::new("clause:termination");
pub const MAINTENANCE: Category = Category::new("clause:maintenance");
pub const UTILITIES: Category = Category::new("clause:utilities");
pub const LAW: Category = Category::new("clause:law");
pub const GOVERNING_LAW: Category = Category::new("clause:governing_law");

/// Rand amounts with an optional `R`/`ZAR` prefix, thousands separators and
/// cents. Bare numbers need separators or at most three digits.
pub const MONEY_PATTERN: &str =
    r"\b(?:(?:R|ZAR)\s?\d+(?:,\d{3})*|\d{1,3}(?:,\d{3})*)(?:\.\d{1,2})?\b";

/// Clause keywords in English and Afrikaans.
pub const CLAUSES: [(Category, &[&str]); 7] = [
    (RENT, &["rent", "monthly rental", "base rent", "huur"]),
    (DEPOSIT, &["security deposit", "deposit", "borg"]),
    (
        TERMINATION,
        &["termination", "cancel", "notice period", "opzegging"],
    ),
    (
        MAINTENANCE,
        &["maintenance", "repair", "landlord shall", "tenant shall"],
    ),
    (
        UTILITIES,
        &["utilities", "electricity", "water", "municipal rates"],
    ),
    (
        LAW,
        &[
            "Rental Housing Act",
            "Consumer Protection Act",
            "CPA",
            "South African law",
        ],
    ),
    (
        GOVERNING_LAW,
        &["governing law", "jurisdiction", "South Africa"],
    ),
];

pub const CONTEXT_BEFORE: usize = 100;
pub const CONTEXT_AFTER: usize = 300;

pub fn catalogue() -> Result<Catalogue, regex::Error> {
    let mut catalogue = Catalogue::new("lease")
        .with_matcher(DateMatcher::new(DATE)?)
        .with_matcher(RegexMatcher::new(MONEY, MONEY_PATTERN)?);

    for (category, keywords) in CLAUSES {
        catalogue = catalogue.with_matcher(
            KeywordMatcher::new(category, keywords.iter().copied())
                .occurrences(Occurrences::First)
                .with_context(CONTEXT_BEFORE, CONTEXT_AFTER),
        );
    }

    Ok(catalogue)
}

/// Numeric amount of a monetary match, keeping only digits and decimal
/// points. `None` when nothing numeric is left.
pub fn parse_amount(value: &str) -> Option<f64> {
    let digits: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// Whether a monetary surface form carries a currency marker.
pub fn is_currency_tagged(value: &str) -> bool {
    value.contains('R') || value.contains("ZAR")
}

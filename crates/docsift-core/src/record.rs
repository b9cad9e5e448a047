use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::acquire::{AcquisitionMethod, EmptyReason};
use crate::metrics::DerivedMetrics;

/// A named match category. The set of categories is fixed by the catalogue of
/// the active pipeline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Category(&'static str);

impl Category {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }

    /// The part after a `group:` prefix, or the whole name.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.0.split_once(':').map_or(self.0, |(_, key)| key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub category: Category,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Byte offset of the match in the acquired text.
    pub offset: usize,
}

impl Match {
    pub fn new(category: Category, value: impl Into<String>, offset: usize) -> Self {
        Self {
            category,
            value: value.into(),
            context: None,
            offset,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Raw matches keyed by category, in catalogue order. Every catalogue
/// category is present, possibly with no matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    entries: Vec<(Category, Vec<Match>)>,
}

impl MatchSet {
    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut entries: Vec<(Category, Vec<Match>)> = Vec::new();
        for category in categories {
            if !entries.iter().any(|(c, _)| *c == category) {
                entries.push((category, Vec::new()));
            }
        }
        Self { entries }
    }

    /// Adds matches to an existing category. Matches for a category outside
    /// the catalogue are dropped.
    pub fn extend(&mut self, category: Category, matches: impl IntoIterator<Item = Match>) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            existing.extend(matches.into_iter().filter(|m| m.category == category));
        } else {
            tracing::debug!(%category, "Dropping matches for unknown category");
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    pub fn contains_category(&self, category: Category) -> bool {
        self.entries.iter().any(|(c, _)| *c == category)
    }

    pub fn get(&self, category: Category) -> &[Match] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(&[][..], |(_, m)| m.as_slice())
    }

    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.get(category).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Match])> {
        self.entries.iter().map(|(c, m)| (*c, m.as_slice()))
    }

    /// Distinct values, sorted.
    pub fn unique_values(&self, category: Category) -> BTreeSet<&str> {
        self.get(category).iter().map(|m| m.value.as_str()).collect()
    }

    /// Distinct values in order of first appearance.
    pub fn values_in_order(&self, category: Category) -> Vec<&str> {
        first_seen(self.get(category).iter().map(|m| m.value.as_str()))
    }

    /// Distinct context windows in order of first appearance.
    pub fn contexts_in_order(&self, category: Category) -> Vec<&str> {
        first_seen(self.get(category).iter().filter_map(|m| m.context.as_deref()))
    }
}

fn first_seen<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    /// `method` is `None` when the document yielded no text but was still
    /// run through the matchers.
    Processed { method: Option<AcquisitionMethod> },
    Skipped { reason: EmptyReason },
}

impl RecordStatus {
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Everything extracted from one document. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRecord {
    pub file_name: String,
    pub stem: String,
    pub status: RecordStatus,
    pub matches: MatchSet,
    pub parties: Vec<String>,
    pub metrics: DerivedMetrics,
}

impl ExtractionRecord {
    pub const fn is_skipped(&self) -> bool {
        self.status.is_skipped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: Category = Category::new("email");
    const RENT: Category = Category::new("clause:rent");

    #[test]
    fn test_category_key() {
        assert_eq!(RENT.key(), "rent");
        assert_eq!(EMAIL.key(), "email");
        assert_eq!(RENT.to_string(), "clause:rent");
    }

    #[test]
    fn test_every_category_present() {
        let set = MatchSet::with_categories([EMAIL, RENT, EMAIL]);
        let categories: Vec<_> = set.categories().collect();
        assert_eq!(categories, [EMAIL, RENT]);
        assert!(set.is_empty(EMAIL));
        assert!(set.get(Category::new("other")).is_empty());
    }

    #[test]
    fn test_unknown_category_dropped() {
        let other = Category::new("other");
        let mut set = MatchSet::with_categories([EMAIL]);
        set.extend(other, [Match::new(other, "x", 0)]);
        assert!(!set.contains_category(other));
    }

    #[test]
    fn test_unique_values_vs_raw_count() {
        let mut set = MatchSet::with_categories([EMAIL]);
        set.extend(
            EMAIL,
            [
                Match::new(EMAIL, "b@example.com", 0),
                Match::new(EMAIL, "a@example.com", 20),
                Match::new(EMAIL, "b@example.com", 40),
            ],
        );

        assert_eq!(set.count(EMAIL), 3);
        let unique: Vec<_> = set.unique_values(EMAIL).into_iter().collect();
        assert_eq!(unique, ["a@example.com", "b@example.com"]);
        assert_eq!(set.values_in_order(EMAIL), ["b@example.com", "a@example.com"]);
    }

    #[test]
    fn test_contexts_in_order() {
        let mut set = MatchSet::with_categories([RENT]);
        set.extend(
            RENT,
            [
                Match::new(RENT, "rent", 5).with_context("monthly rent of R5000"),
                Match::new(RENT, "huur", 9).with_context("huur van R5000"),
                Match::new(RENT, "monthly rental", 5).with_context("monthly rent of R5000"),
            ],
        );
        assert_eq!(
            set.contexts_in_order(RENT),
            ["monthly rent of R5000", "huur van R5000"]
        );
    }
}

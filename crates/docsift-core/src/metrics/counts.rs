use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{DerivedMetrics, MetricsStrategy};
use crate::extract::Extraction;
use crate::record::Category;

/// Raw match count per category, in catalogue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: Vec<(Category, usize)>,
}

impl CountTable {
    pub fn get(&self, category: Category) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

impl Serialize for CountTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (category, count) in &self.counts {
            map.serialize_entry(category.name(), count)?;
        }
        map.end()
    }
}

/// Counts every raw match, duplicates included.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryCounts;

impl MetricsStrategy for CategoryCounts {
    fn name(&self) -> &'static str {
        "category-counts"
    }

    fn derive(&self, extraction: &Extraction) -> DerivedMetrics {
        DerivedMetrics::Counts(CountTable {
            counts: extraction
                .matches
                .iter()
                .map(|(category, matches)| (category, matches.len()))
                .collect(),
        })
    }
}

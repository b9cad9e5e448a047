use regex::Regex;

use crate::patterns::Catalogue;
use crate::record::{Category, MatchSet};

/// How far into the text the parties heuristic looks, in chars.
pub const PARTIES_WINDOW: usize = 2000;

/// Category matches plus the optional parties pair for one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub matches: MatchSet,
    /// Empty or exactly two names.
    pub parties: Vec<String>,
}

/// Finds the two names in a "between X and Y" phrase near the top of a
/// document.
pub struct PartiesHeuristic {
    pattern: Regex,
}

impl PartiesHeuristic {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"(?i)between\s+(.*?)\s+and\s+(.*?)\s")?,
        })
    }

    pub fn find(&self, text: &str) -> Vec<String> {
        let head = match text.char_indices().nth(PARTIES_WINDOW) {
            Some((end, _)) => &text[..end],
            None => text,
        };

        self.pattern
            .captures(head)
            .and_then(|caps| {
                let first = caps.get(1)?.as_str().trim();
                let second = caps.get(2)?.as_str().trim();
                Some(vec![first.to_string(), second.to_string()])
            })
            .unwrap_or_default()
    }
}

/// Applies a catalogue to text. Stateless between calls.
pub struct FieldExtractor {
    catalogue: Catalogue,
    parties: Option<PartiesHeuristic>,
}

impl FieldExtractor {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            parties: None,
        }
    }

    #[must_use]
    pub fn with_parties(mut self, heuristic: PartiesHeuristic) -> Self {
        self.parties = Some(heuristic);
        self
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn categories(&self) -> Vec<Category> {
        self.catalogue.categories()
    }

    pub fn extract(&self, text: &str) -> Extraction {
        let matches = self.catalogue.find_all(text);
        let parties = self
            .parties
            .as_ref()
            .map(|h| h.find(text))
            .unwrap_or_default();

        tracing::trace!(
            catalogue = self.catalogue.name(),
            matches = matches.iter().map(|(_, m)| m.len()).sum::<usize>(),
            parties = parties.len(),
            "Extracted fields"
        );

        Extraction { matches, parties }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{lease, pii};

    const LEASE_TEXT: &str = "This lease is made between John Smith and Acme Properties (Pty) Ltd \
        on 1 March 2024. The monthly rental is R5000 and a security deposit of R10,000 \
        is payable. Either party may cancel with a notice period of one calendar month. \
        This agreement is governed by South African law.";

    fn lease_extractor() -> FieldExtractor {
        FieldExtractor::new(lease::catalogue().unwrap()).with_parties(PartiesHeuristic::new().unwrap())
    }

    #[test]
    fn test_parties_between_and() {
        let heuristic = PartiesHeuristic::new().unwrap();
        assert_eq!(heuristic.find(LEASE_TEXT), ["John Smith", "Acme"]);
        assert_eq!(
            heuristic.find("BETWEEN  Jane Doe  AND  Bob\nhereafter"),
            ["Jane Doe", "Bob"]
        );
    }

    #[test]
    fn test_parties_absent() {
        let heuristic = PartiesHeuristic::new().unwrap();
        assert!(heuristic.find("An agreement with no named parties.").is_empty());
        assert!(heuristic.find("").is_empty());
    }

    #[test]
    fn test_parties_only_near_top() {
        let heuristic = PartiesHeuristic::new().unwrap();
        let text = format!("{} between Ann and Ben here", "é".repeat(PARTIES_WINDOW));
        assert!(heuristic.find(&text).is_empty());
    }

    #[test]
    fn test_lease_extraction() {
        let extraction = lease_extractor().extract(LEASE_TEXT);

        assert_eq!(extraction.parties.len(), 2);
        assert_eq!(extraction.matches.values_in_order(lease::DATE), ["2024-03-01"]);
        // Bare short numbers such as the day of a date also count.
        assert_eq!(
            extraction.matches.values_in_order(lease::MONEY),
            ["1", "R5000", "R10,000"]
        );
        assert!(!extraction.matches.is_empty(lease::RENT));
        assert!(!extraction.matches.is_empty(lease::TERMINATION));
        assert!(!extraction.matches.is_empty(lease::GOVERNING_LAW));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = lease_extractor();
        assert_eq!(extractor.extract(LEASE_TEXT), extractor.extract(LEASE_TEXT));

        let pii = FieldExtractor::new(pii::catalogue().unwrap());
        let text = "mail a@b.co.za or call 0821234567";
        assert_eq!(pii.extract(text), pii.extract(text));
    }

    #[test]
    fn test_every_category_is_a_key() {
        for extractor in [lease_extractor(), FieldExtractor::new(pii::catalogue().unwrap())] {
            let categories = extractor.categories();
            for text in ["", "   ", "nothing to see", LEASE_TEXT] {
                let extraction = extractor.extract(text);
                let keys: Vec<_> = extraction.matches.categories().collect();
                assert_eq!(keys, categories);
            }
        }
    }
}

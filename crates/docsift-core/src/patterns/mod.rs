//! Pattern library: named matchers applied uniformly to acquired text.
//!
//! A [`Catalogue`] is an ordered list of [`Matcher`]s. Adding a category to a
//! pipeline means adding one matcher entry.

pub mod dates;
pub mod lease;
pub mod pii;

pub use dates::DateMatcher;

use regex::Regex;

use crate::record::{Category, Match, MatchSet};

pub trait Matcher: Send + Sync {
    fn category(&self) -> Category;

    /// Raw matches in text order. Never fails; no match is an empty list.
    fn find(&self, text: &str) -> Vec<Match>;
}

/// Regular expression matcher reporting the matched substring, optionally
/// rewritten by a normalizer.
pub struct RegexMatcher {
    category: Category,
    regex: Regex,
    normalize: Option<fn(&str) -> String>,
}

impl RegexMatcher {
    pub fn new(category: Category, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            category,
            regex: Regex::new(pattern)?,
            normalize: None,
        })
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalize: fn(&str) -> String) -> Self {
        self.normalize = Some(normalize);
        self
    }
}

impl Matcher for RegexMatcher {
    fn category(&self) -> Category {
        self.category
    }

    fn find(&self, text: &str) -> Vec<Match> {
        self.regex
            .find_iter(text)
            .map(|m| {
                let value = self
                    .normalize
                    .map_or_else(|| m.as_str().to_string(), |f| f(m.as_str()));
                Match::new(self.category, value, m.start())
            })
            .collect()
    }
}

/// How many hits a keyword contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrences {
    First,
    Every,
}

/// Case-insensitive keyword list matcher.
///
/// Keywords are compared against a lowercased copy of the text that keeps one
/// char per input char, so offsets and context windows refer to the
/// input text.
pub struct KeywordMatcher {
    category: Category,
    keywords: Vec<(String, Vec<char>)>,
    occurrences: Occurrences,
    window: Option<(usize, usize)>,
}

impl KeywordMatcher {
    pub fn new<I, S>(category: Category, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.trim().is_empty())
            .map(|k| {
                let folded = k.chars().map(fold_char).collect();
                (k, folded)
            })
            .collect();

        Self {
            category,
            keywords,
            occurrences: Occurrences::Every,
            window: None,
        }
    }

    #[must_use]
    pub const fn occurrences(mut self, occurrences: Occurrences) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// Attach up to `before` chars preceding and `after` chars following the
    /// start of each hit as context.
    #[must_use]
    pub const fn with_context(mut self, before: usize, after: usize) -> Self {
        self.window = Some((before, after));
        self
    }

    fn hits(&self, haystack: &[char], needle: &[char]) -> Vec<usize> {
        if needle.is_empty() || needle.len() > haystack.len() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for start in 0..=haystack.len() - needle.len() {
            if haystack[start..start + needle.len()] != *needle {
                continue;
            }
            hits.push(start);
            if self.occurrences == Occurrences::First {
                break;
            }
        }
        hits
    }
}

impl Matcher for KeywordMatcher {
    fn category(&self) -> Category {
        self.category
    }

    fn find(&self, text: &str) -> Vec<Match> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let folded: Vec<char> = chars.iter().map(|(_, c)| fold_char(*c)).collect();
        let byte_at = |idx: usize| chars.get(idx).map_or(text.len(), |(b, _)| *b);

        let mut found: Vec<Match> = Vec::new();
        for (keyword, needle) in &self.keywords {
            for start in self.hits(&folded, needle) {
                let mut m = Match::new(self.category, keyword.clone(), byte_at(start));
                if let Some((before, after)) = self.window {
                    let from = start.saturating_sub(before);
                    let to = (start + after).min(chars.len());
                    m = m.with_context(&text[byte_at(from)..byte_at(to)]);
                }
                found.push(m);
            }
        }

        found.sort_by_key(|m| m.offset);
        found
    }
}

/// Lowercase a char only when that keeps it a single char.
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Ordered, named collection of matchers.
pub struct Catalogue {
    name: &'static str,
    matchers: Vec<Box<dyn Matcher>>,
}

impl Catalogue {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            matchers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared categories in catalogue order, without repeats.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::with_capacity(self.matchers.len());
        for matcher in &self.matchers {
            let category = matcher.category();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// Runs every matcher. The result has a key for every category.
    pub fn find_all(&self, text: &str) -> MatchSet {
        let mut set = MatchSet::with_categories(self.categories());
        for matcher in &self.matchers {
            set.extend(matcher.category(), matcher.find(text));
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORD: Category = Category::new("word");
    const CLAUSE: Category = Category::new("clause:test");

    #[test]
    fn test_regex_matcher_normalizes() {
        let matcher = RegexMatcher::new(WORD, r"\d+-\d+")
            .unwrap()
            .with_normalizer(|s| s.replace('-', ""));
        let found = matcher.find("codes 12-34 and 5-6");
        let values: Vec<_> = found.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, ["1234", "56"]);
        assert_eq!(found[0].offset, 6);
    }

    #[test]
    fn test_invalid_regex_is_error() {
        assert!(RegexMatcher::new(WORD, r"(unclosed").is_err());
    }

    #[test]
    fn test_keyword_case_insensitive_every_occurrence() {
        let matcher = KeywordMatcher::new(WORD, ["Deposit"]);
        let found = matcher.find("DEPOSIT first, deposit again");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, "Deposit");
        assert_eq!(found[1].offset, 15);
    }

    #[test]
    fn test_keyword_first_occurrence_only() {
        let matcher = KeywordMatcher::new(WORD, ["rent"]).occurrences(Occurrences::First);
        assert_eq!(matcher.find("rent, rent, rent").len(), 1);
    }

    #[test]
    fn test_keyword_matches_inside_words() {
        let matcher = KeywordMatcher::new(WORD, ["Oman"]);
        let found = matcher.find("the woman signed");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "Oman");
        assert_eq!(found[0].offset, 5);
    }

    #[test]
    fn test_context_window_bounds() {
        let matcher = KeywordMatcher::new(CLAUSE, ["rent"]).with_context(100, 300);

        let short = matcher.find("rent");
        assert_eq!(short[0].context.as_deref(), Some("rent"));

        let text = format!("{}rent{}", "a".repeat(150), "b".repeat(400));
        let found = matcher.find(&text);
        let context = found[0].context.as_deref().unwrap();
        assert_eq!(context.chars().count(), 400);
        assert!(context.starts_with(&"a".repeat(100)));
        assert!(context.contains("rent"));
    }

    #[test]
    fn test_context_window_counts_chars_not_bytes() {
        let matcher = KeywordMatcher::new(CLAUSE, ["huur"]).with_context(3, 6);
        let found = matcher.find("één huur ëë");
        assert_eq!(found[0].context.as_deref(), Some("én huur ë"));
        assert_eq!(&"één huur ëë"[found[0].offset..found[0].offset + 4], "huur");
    }

    #[test]
    fn test_catalogue_covers_every_category() {
        let catalogue = Catalogue::new("test")
            .with_matcher(KeywordMatcher::new(WORD, ["alpha"]))
            .with_matcher(KeywordMatcher::new(CLAUSE, ["beta"]))
            .with_matcher(KeywordMatcher::new(WORD, ["gamma"]));

        assert_eq!(catalogue.categories(), [WORD, CLAUSE]);

        let set = catalogue.find_all("gamma alpha");
        assert_eq!(set.count(WORD), 2);
        assert!(set.contains_category(CLAUSE));
        assert!(set.is_empty(CLAUSE));

        let empty = catalogue.find_all("");
        assert_eq!(empty.categories().count(), 2);
    }
}

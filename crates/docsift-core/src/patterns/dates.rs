//! Free-text date search with day-month-year preference.
//!
//! Recognizes ISO dates, numeric day/month/year dates and dates with English
//! or Afrikaans month names. Every hit is validated as a real calendar date
//! and reported in ISO 8601 form, once per distinct date.

use std::collections::HashSet;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::Matcher;
use crate::record::{Category, Match};

const MONTH: &str = r"(?P<month>jan(?:uary|uarie)?|feb(?:ruary|ruarie)?|maart|mar(?:ch)?|apr(?:il)?|may|mei|jun(?:e|ie)?|jul(?:y|ie)?|aug(?:ust|ustus)?|sep(?:t(?:ember)?)?|oct(?:ober)?|okt(?:ober)?|nov(?:ember)?|dec(?:ember)?|des(?:ember)?)\b\.?";

#[derive(Debug, Clone, Copy)]
enum Layout {
    YearMonthDay,
    DayMonthYear,
    DayNamedMonthYear,
    NamedMonthDayYear,
}

pub struct DateMatcher {
    category: Category,
    patterns: Vec<(Layout, Regex)>,
}

impl DateMatcher {
    pub fn new(category: Category) -> Result<Self, regex::Error> {
        let patterns = vec![
            (
                Layout::YearMonthDay,
                Regex::new(r"\b(?P<year>\d{4})[-/.](?P<month>\d{1,2})[-/.](?P<day>\d{1,2})\b")?,
            ),
            (
                Layout::DayMonthYear,
                Regex::new(
                    r"\b(?P<day>\d{1,2})[-/.](?P<month>\d{1,2})[-/.](?P<year>\d{4}|\d{2})\b",
                )?,
            ),
            (
                Layout::DayNamedMonthYear,
                Regex::new(&format!(
                    r"(?i)\b(?P<day>\d{{1,2}})(?:st|nd|rd|th|ste|de)?(?:\s+(?:of|van))?\s+{MONTH},?\s+(?P<year>\d{{4}})\b"
                ))?,
            ),
            (
                Layout::NamedMonthDayYear,
                Regex::new(&format!(
                    r"(?i)\b{MONTH}\s+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?,?\s+(?P<year>\d{{4}})\b"
                ))?,
            ),
        ];

        Ok(Self { category, patterns })
    }
}

impl Matcher for DateMatcher {
    fn category(&self) -> Category {
        self.category
    }

    fn find(&self, text: &str) -> Vec<Match> {
        let mut candidates: Vec<(usize, usize, NaiveDate)> = Vec::new();
        for (layout, regex) in &self.patterns {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if let Some(date) = to_date(*layout, &caps) {
                    candidates.push((whole.start(), whole.end(), date));
                }
            }
        }

        // Earlier start wins; among equal starts, the longer match.
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut seen = HashSet::new();
        let mut covered_to = 0;
        let mut found = Vec::new();
        for (start, end, date) in candidates {
            if start < covered_to {
                continue;
            }
            covered_to = end;
            if seen.insert(date) {
                found.push(Match::new(
                    self.category,
                    date.format("%Y-%m-%d").to_string(),
                    start,
                ));
            }
        }
        found
    }
}

fn to_date(layout: Layout, caps: &Captures<'_>) -> Option<NaiveDate> {
    let number = |name: &str| caps.name(name)?.as_str().parse::<u32>().ok();

    let day = number("day")?;
    let month = match layout {
        Layout::YearMonthDay | Layout::DayMonthYear => number("month")?,
        Layout::DayNamedMonthYear | Layout::NamedMonthDayYear => {
            month_number(caps.name("month")?.as_str())?
        }
    };

    let year_text = caps.name("year")?.as_str();
    let mut year = year_text.parse::<i32>().ok()?;
    if year_text.len() == 2 {
        year += if year < 70 { 2000 } else { 1900 };
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    let month = match prefix {
        "jan" => 1,
        "feb" => 2,
        "mar" | "maa" => 3,
        "apr" => 4,
        "may" | "mei" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" | "okt" => 10,
        "nov" => 11,
        "dec" | "des" => 12,
        _ => return None,
    };
    Some(month)
}

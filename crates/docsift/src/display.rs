use console::style;

use docsift_core::patterns::{lease, pii};
use docsift_core::record::RecordStatus;
use docsift_core::{BatchSummary, ExtractionRecord, PipelineVariant};

const EXCERPT_WIDTH: usize = 100;
const TOTAL: &str = "total";

pub fn print_summary(summary: &BatchSummary) {
    match summary.variant {
        PipelineVariant::Lease => summary.records.iter().for_each(print_lease),
        PipelineVariant::Pii => print_pii_table(&summary.records),
    }

    println!();
    println!(
        "{} processed, {} skipped{}",
        style(summary.processed_count()).bold(),
        summary.skipped_count(),
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    println!("Summary: {}", summary.summary_path.display());
}

fn print_lease(record: &ExtractionRecord) {
    let matches = &record.matches;
    let score = record
        .metrics
        .compliance()
        .map_or_else(|| "-".to_string(), |c| c.health_score.to_string());

    println!();
    println!("{} {}", style("File:").bold(), style(&record.file_name).cyan());
    println!("  Health Score:     {score}/100");
    println!("  Parties:          {}", list(record.parties.iter().map(String::as_str)));
    println!("  Dates:            {}", list(matches.unique_values(lease::DATE)));
    println!("  Monetary Values:  {}", list(matches.values_in_order(lease::MONEY)));

    for (label, category) in [
        ("Rent", lease::RENT),
        ("Deposit", lease::DEPOSIT),
        ("Termination", lease::TERMINATION),
    ] {
        let excerpts = matches.contexts_in_order(category).join(" | ");
        println!("  {:<18}{}", format!("{label}:"), excerpt(&excerpts));
    }

    let flags = record
        .metrics
        .compliance()
        .map(|c| c.compliance_flags.as_slice())
        .unwrap_or_default();
    if flags.is_empty() {
        println!("  Compliance Flags: {}", style("none").green());
    } else {
        for flag in flags {
            println!("  Compliance Flag:  {}", style(flag).red());
        }
    }
}

fn print_pii_table(records: &[ExtractionRecord]) {
    let name_width = records
        .iter()
        .map(|r| r.file_name.chars().count())
        .chain(std::iter::once("File Name".len()))
        .max()
        .unwrap_or_default();

    let mut header = format!("{:<name_width$}", "File Name");
    for (category, _) in pii::COLUMNS {
        header.push_str(&format!("  {:>width$}", category.name(), width = column_width(category.name())));
    }
    header.push_str(&format!("  {:>width$}", TOTAL, width = column_width(TOTAL)));
    println!("{}", style(header).bold());

    for record in records {
        let mut row = format!("{:<name_width$}", record.file_name);
        match &record.status {
            RecordStatus::Skipped { reason } => {
                row.push_str(&format!("  {}", style(format!("Skipped ({reason})")).yellow()));
            }
            RecordStatus::Processed { .. } => {
                let counts = record.metrics.counts();
                for (category, _) in pii::COLUMNS {
                    let count = counts.map_or(0, |c| c.get(category));
                    row.push_str(&format!(
                        "  {:>width$}",
                        count,
                        width = column_width(category.name())
                    ));
                }
                let total = counts.map_or(0, |c| c.total());
                row.push_str(&format!("  {:>width$}", total, width = column_width(TOTAL)));
            }
        }
        println!("{row}");
    }
}

fn column_width(name: &str) -> usize {
    name.len().max(3)
}

fn list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = values.into_iter().collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

fn excerpt(text: &str) -> String {
    if text.is_empty() {
        return "-".to_string();
    }
    match text.char_indices().nth(EXCERPT_WIDTH) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_chars() {
        let long = "é".repeat(150);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), EXCERPT_WIDTH + 3);
        assert!(short.ends_with("..."));
        assert_eq!(excerpt("huur"), "huur");
        assert_eq!(excerpt(""), "-");
    }

    #[test]
    fn test_list_placeholder() {
        assert_eq!(list(Vec::new()), "-");
        assert_eq!(list(["Ann", "Ben"]), "Ann, Ben");
    }
}

//! Shared helper functions for CLI commands
//!
//! List output for every command goes through [`Listing`], so the formats
//! behave the same everywhere.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::entities::part::PartStatus;
use crate::entities::stage::StageStatus;
use crate::entities::test::TestOutcome;

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Shorten a record id for table cells
pub fn format_short_id(id: &str) -> String {
    if id.len() > 16 {
        format!("{}...", &id[..13])
    } else {
        id.to_string()
    }
}

pub fn styled_stage_status(status: StageStatus) -> String {
    match status {
        StageStatus::Pending => style(status).dim().to_string(),
        StageStatus::InProgress => style(status).yellow().to_string(),
        StageStatus::Done => style(status).green().to_string(),
    }
}

pub fn styled_part_status(status: PartStatus) -> String {
    match status {
        PartStatus::Installed => style(status).green().to_string(),
        _ => style(status).cyan().to_string(),
    }
}

pub fn styled_outcome(outcome: TestOutcome) -> String {
    match outcome {
        TestOutcome::Approved => style(outcome).green().to_string(),
        TestOutcome::Rejected => style(outcome).red().to_string(),
    }
}

/// Rows of a list command, rendered according to the output format
pub struct Listing {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    ids: Vec<String>,
}

impl Listing {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
            ids: Vec::new(),
        }
    }

    /// Add a row; `id` is what `--format id` prints for it
    pub fn push(&mut self, id: impl Into<String>, row: Vec<String>) {
        self.ids.push(id.into());
        self.rows.push(row);
    }

    /// Print in `format`; `records` backs the json and yaml formats
    pub fn print<T: Serialize + ?Sized>(&self, format: OutputFormat, records: &T) -> Result<()> {
        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(records).into_diagnostic()?;
                println!("{}", json);
            }
            OutputFormat::Yaml => {
                let yaml = serde_yml::to_string(records).into_diagnostic()?;
                print!("{}", yaml);
            }
            OutputFormat::Csv => {
                print!("{}", self.to_csv()?);
            }
            OutputFormat::Tsv => {
                println!("{}", self.headers.join("\t"));
                for row in &self.rows {
                    println!("{}", row.join("\t"));
                }
            }
            OutputFormat::Id => {
                for id in &self.ids {
                    println!("{}", id);
                }
            }
            OutputFormat::Md => {
                println!("{}", self.table().with(Style::markdown()));
            }
            OutputFormat::Auto => {
                println!("{}", self.table().with(Style::blank()));
            }
        }
        Ok(())
    }

    fn table(&self) -> tabled::Table {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().copied());
        for row in &self.rows {
            builder.push_record(row.iter().map(|c| console::strip_ansi_codes(c).to_string()));
        }
        builder.build()
    }

    fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers).into_diagnostic()?;
        for row in &self.rows {
            let plain: Vec<String> = row
                .iter()
                .map(|c| console::strip_ansi_codes(c).to_string())
                .collect();
            writer.write_record(&plain).into_diagnostic()?;
        }
        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }
}

/// Print a single record; `auto` means yaml
pub fn print_record<T: Serialize + ?Sized>(format: OutputFormat, id: &str, record: &T) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(record).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", id),
        _ => {
            let yaml = serde_yml::to_string(record).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("aeronáutica", 6), "aer...");
    }

    #[test]
    fn test_format_short_id() {
        assert_eq!(format_short_id("SHORT"), "SHORT");
        assert_eq!(
            format_short_id("PRT-01J123456789ABCDEF123456"),
            "PRT-01J123456..."
        );
    }

    #[test]
    fn test_csv_quotes_fields() {
        let mut listing = Listing::new(&["NAME", "SUPPLIER"]);
        listing.push("PRT-1", vec!["Wing, left".to_string(), "Acme".to_string()]);
        let csv = listing.to_csv().unwrap();
        assert_eq!(csv, "NAME,SUPPLIER\n\"Wing, left\",Acme\n");
    }

    #[test]
    fn test_table_strips_styling() {
        let mut listing = Listing::new(&["STATUS"]);
        listing.push("x", vec![styled_stage_status(StageStatus::Done)]);
        let rendered = listing.table().with(Style::markdown()).to_string();
        assert!(rendered.contains("| done"));
        assert!(!rendered.contains('\u{1b}'));
    }
}

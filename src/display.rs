//! Output Formatting and Display Management
//!
//! Renders query results for the `cdr-query` binary, either as colored text
//! for a terminal or as JSON for scripts.
//!
//! ## JSON shapes
//!
//! - `reference`: the record object, or `null` when absent
//! - `summary`: `{"start": ..., "end": ..., "count": 2, "totalDuration": 180.0}`
//! - `caller` / `top`: an array of record objects
//! - `stats`: the [`LoadReport`] object
//!
//! Record dates in JSON are ISO-8601 (`2024-01-02`); the text view uses the
//! configured display format.
//!
//! Renderers return `String`s so they can be tested; the `display_*` methods
//! print them.

use crate::models::*;
use crate::query::DateRange;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

pub struct DisplayManager {
    json_output: bool,
    json_pretty: bool,
    date_format: String,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(false, false, crate::field_parser::DATE_FORMAT)
    }
}

impl DisplayManager {
    pub fn new(json_output: bool, json_pretty: bool, date_format: impl Into<String>) -> Self {
        Self {
            json_output,
            json_pretty,
            date_format: date_format.into(),
        }
    }

    pub fn display_record(&self, reference: &str, record: Option<&CallDetailRecord>) -> Result<()> {
        println!("{}", self.render_record(reference, record)?);
        Ok(())
    }

    pub fn display_summary(&self, range: DateRange, summary: &CallSummary) -> Result<()> {
        println!("{}", self.render_summary(range, summary)?);
        Ok(())
    }

    pub fn display_records(&self, title: &str, records: &[&CallDetailRecord]) -> Result<()> {
        println!("{}", self.render_records(title, records)?);
        Ok(())
    }

    pub fn display_report(&self, report: &LoadReport) -> Result<()> {
        println!("{}", self.render_report(report)?);
        Ok(())
    }

    pub fn render_record(&self, reference: &str, record: Option<&CallDetailRecord>) -> Result<String> {
        if self.json_output {
            return self.to_json(&record);
        }

        Ok(match record {
            Some(record) => self.format_record(record),
            None => format!(
                "{} No call found with reference {}",
                "✗".bright_red(),
                reference.bright_white().bold()
            ),
        })
    }

    pub fn render_summary(&self, range: DateRange, summary: &CallSummary) -> Result<String> {
        if self.json_output {
            let output = serde_json::json!({
                "start": range.start,
                "end": range.end,
                "count": summary.count,
                "totalDuration": summary.total_duration,
            });
            return self.to_json(&output);
        }

        Ok(format!(
            "{} {} to {}: {} calls, {} total duration",
            "📊".bright_yellow(),
            self.format_date(range.start).bright_white().bold(),
            self.format_date(range.end).bright_white().bold(),
            summary.count.to_string().bright_white().bold(),
            format_amount(summary.total_duration).bright_green().bold()
        ))
    }

    pub fn render_records(&self, title: &str, records: &[&CallDetailRecord]) -> Result<String> {
        if self.json_output {
            return self.to_json(&records);
        }

        let mut lines = vec![
            "=".repeat(80).bright_cyan().to_string(),
            title.bright_white().bold().to_string(),
            "=".repeat(80).bright_cyan().to_string(),
        ];

        if records.is_empty() {
            lines.push("No matching calls.".dimmed().to_string());
        } else {
            for record in records {
                lines.push(self.format_record(record));
            }
            let total_cost: f64 = records.iter().map(|r| r.cost).sum();
            lines.push(format!(
                "\n{} calls • {} total cost",
                records.len().to_string().bright_white().bold(),
                format!("{:.2}", total_cost).bright_green().bold()
            ));
        }

        Ok(lines.join("\n"))
    }

    pub fn render_report(&self, report: &LoadReport) -> Result<String> {
        if self.json_output {
            return self.to_json(report);
        }

        let mut lines = vec![
            format!("{} Load report", "📊".bright_yellow()),
            format!("   Files:            {}", report.files.to_string().bright_white().bold()),
            format!("   Data lines:       {}", report.lines),
            format!("   Records:          {}", report.records.to_string().bright_white().bold()),
            format!("   Blank lines:      {}", report.blank_lines),
            format!("   Short lines:      {}", report.short_lines),
            format!("   Degraded records: {}", report.degraded_records),
        ];
        for (field, count) in &report.field_faults {
            lines.push(format!(
                "      {}: {}",
                field.name().bright_cyan(),
                count.to_string().bright_yellow()
            ));
        }

        Ok(lines.join("\n"))
    }

    fn format_record(&self, record: &CallDetailRecord) -> String {
        format!(
            "{} {} {} → {} on {} until {}, {}s, {} {} [{}]",
            "📞".bright_blue(),
            record.reference.bright_white().bold(),
            record.caller_id.bright_cyan(),
            record.recipient.bright_cyan(),
            self.format_date(record.call_date),
            record.end_time.format("%H:%M:%S"),
            format_amount(record.duration),
            format!("{:.2}", record.cost).bright_green(),
            record.currency,
            record.call_type
        )
    }

    // Falls back to ISO-8601 when the format asks for more than a date
    fn format_date(&self, date: chrono::NaiveDate) -> String {
        let mut formatted = String::new();
        match write!(formatted, "{}", date.format(&self.date_format)) {
            Ok(()) => formatted,
            Err(_) => date.to_string(),
        }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.json_pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.context("Error serializing output to JSON")
    }
}

// Durations are usually whole seconds; avoid printing "180.00"
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

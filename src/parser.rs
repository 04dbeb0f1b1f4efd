//! CDR line and file parsing
//!
//! Lines are split naively on `,` and read positionally. Each column is
//! converted on its own; a column that fails conversion is replaced by its
//! sentinel and reported as a [`FieldFault`], and the record is still admitted.
//! Only a line with fewer than nine columns is dropped.

use crate::error::{Result, StoreError};
use crate::field_parser::FieldParser;
use crate::models::*;
use chrono::{NaiveDate, NaiveTime};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// A column that failed conversion and was replaced by its sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFault {
    pub field: CdrField,
    pub reason: String,
}

/// A record together with the faults absorbed while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub record: CallDetailRecord,
    pub faults: Vec<FieldFault>,
}

impl ParsedLine {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Parsed(ParsedLine),
    Blank,
    TooFewColumns { found: usize },
}

// Trait for custom record handling while a file is read
pub trait RecordProcessor {
    type Output;

    fn process_record(&mut self, parsed: ParsedLine, line_number: usize);
    fn finalize(self) -> Self::Output;
}

pub struct CdrParser;

impl Default for CdrParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CdrParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one data line. Columns past the ninth are ignored.
    pub fn parse_line(&self, line: &str) -> LineOutcome {
        if line.trim().is_empty() {
            return LineOutcome::Blank;
        }

        let columns: Vec<&str> = line.split(',').map(str::trim).collect();
        if columns.len() < CdrField::COUNT {
            return LineOutcome::TooFewColumns {
                found: columns.len(),
            };
        }

        let mut faults = Vec::new();
        let record = CallDetailRecord {
            caller_id: columns[0].to_string(),
            recipient: columns[1].to_string(),
            call_date: or_sentinel(
                FieldParser::parse_date(columns[2]),
                CdrField::CallDate,
                NaiveDate::MIN,
                &mut faults,
            ),
            end_time: or_sentinel(
                FieldParser::parse_time(columns[3]),
                CdrField::EndTime,
                NaiveTime::MIN,
                &mut faults,
            ),
            duration: or_sentinel(
                FieldParser::parse_amount(columns[4]),
                CdrField::Duration,
                0.0,
                &mut faults,
            ),
            cost: or_sentinel(
                FieldParser::parse_amount(columns[5]),
                CdrField::Cost,
                0.0,
                &mut faults,
            ),
            reference: columns[6].to_string(),
            currency: columns[7].to_string(),
            call_type: or_sentinel(
                FieldParser::parse_call_type(columns[8]),
                CdrField::CallType,
                CallType::None,
                &mut faults,
            ),
        };

        LineOutcome::Parsed(ParsedLine { record, faults })
    }

    /// Parse a whole file into records plus its report.
    pub fn parse_file(&self, file_path: &Path) -> Result<(Vec<CallDetailRecord>, LoadReport)> {
        self.process_file(file_path, CollectorProcessor::new())
    }

    // Generic method that accepts any processor
    pub fn process_file<P: RecordProcessor>(
        &self,
        file_path: &Path,
        mut processor: P,
    ) -> Result<(P::Output, LoadReport)> {
        let io_error = |source| StoreError::Io {
            path: file_path.to_path_buf(),
            source,
        };

        let file = File::open(file_path).map_err(io_error)?;
        let reader = BufReader::new(file);
        let mut report = LoadReport {
            files: 1,
            ..Default::default()
        };

        for (index, line) in reader.split(b'\n').enumerate() {
            let bytes = line.map_err(io_error)?;
            let line_number = index + 1;

            // Header row, never validated
            if line_number == 1 {
                continue;
            }
            report.lines += 1;

            let line = String::from_utf8_lossy(&bytes);
            match self.parse_line(&line) {
                LineOutcome::Parsed(parsed) => {
                    for fault in &parsed.faults {
                        debug!(
                            file = %file_path.display(),
                            line = line_number,
                            field = %fault.field,
                            reason = %fault.reason,
                            "Substituted sentinel for unparsable field"
                        );
                    }
                    report.record_faults(parsed.faults.iter().map(|f| f.field));
                    report.records += 1;
                    processor.process_record(parsed, line_number);
                }
                LineOutcome::Blank => {
                    report.blank_lines += 1;
                }
                LineOutcome::TooFewColumns { found } => {
                    warn!(
                        file = %file_path.display(),
                        line = line_number,
                        columns = found,
                        expected = CdrField::COUNT,
                        "Skipping line with too few columns"
                    );
                    report.short_lines += 1;
                }
            }
        }

        Ok((processor.finalize(), report))
    }
}

fn or_sentinel<T>(
    parsed: anyhow::Result<T>,
    field: CdrField,
    sentinel: T,
    faults: &mut Vec<FieldFault>,
) -> T {
    match parsed {
        Ok(value) => value,
        Err(e) => {
            faults.push(FieldFault {
                field,
                reason: e.to_string(),
            });
            sentinel
        }
    }
}

// Default processor that collects all records into a Vec
pub struct CollectorProcessor {
    records: Vec<CallDetailRecord>,
}

impl Default for CollectorProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorProcessor {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl RecordProcessor for CollectorProcessor {
    type Output = Vec<CallDetailRecord>;

    fn process_record(&mut self, parsed: ParsedLine, _line_number: usize) {
        self.records.push(parsed.record);
    }

    fn finalize(self) -> Self::Output {
        self.records
    }
}

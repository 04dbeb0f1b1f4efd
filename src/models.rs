//! Core Data Models
//!
//! This module defines the data structures shared by the loader and the query
//! engine.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: one comma-separated line from a CDR export
//! 2. **Record**: [`CallDetailRecord`] - the typed form of that line, with any
//!    unparsable field replaced by its sentinel
//! 3. **Aggregates**: [`CallSummary`] - fixed-shape result of the count/duration query
//!
//! ## Sentinels
//!
//! Ingestion never drops a line because one field is bad. The substitutions are:
//!
//! | field                  | sentinel              |
//! |------------------------|-----------------------|
//! | `call_date`            | [`NaiveDate::MIN`]    |
//! | `end_time`             | [`NaiveTime::MIN`]    |
//! | `duration`, `cost`     | `0.0`                 |
//! | `call_type`            | [`CallType::None`]    |
//!
//! String fields are taken verbatim (after trimming), so they cannot degrade.
//! A sentinel is indistinguishable from a genuine zero or earliest value; use
//! [`LoadReport`] to see how many substitutions a load made.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One logged phone call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDetailRecord {
    #[serde(rename = "callerId")]
    pub caller_id: String,
    pub recipient: String,
    #[serde(rename = "callDate")]
    pub call_date: NaiveDate,
    /// Time of day the call ended. Stored apart from `call_date` as the export does.
    #[serde(rename = "endTime")]
    pub end_time: NaiveTime,
    pub duration: f64,
    pub cost: f64,
    pub reference: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
}

/// Categorical call tag. `None` is the sentinel for an unrecognised value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CallType {
    #[default]
    None,
    Local,
    Domestic,
    International,
}

impl CallType {
    /// Parse a `type` column value. Accepts variant names in any case and the
    /// numeric codes `1` (domestic) and `2` (international).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value {
            "1" => return Some(CallType::Domestic),
            "2" => return Some(CallType::International),
            _ => {}
        }

        if value.eq_ignore_ascii_case("none") {
            Some(CallType::None)
        } else if value.eq_ignore_ascii_case("local") {
            Some(CallType::Local)
        } else if value.eq_ignore_ascii_case("domestic") {
            Some(CallType::Domestic)
        } else if value.eq_ignore_ascii_case("international") {
            Some(CallType::International)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::None => "None",
            CallType::Local => "Local",
            CallType::Domestic => "Domestic",
            CallType::International => "International",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional columns of a CDR line, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CdrField {
    CallerId,
    Recipient,
    CallDate,
    EndTime,
    Duration,
    Cost,
    Reference,
    Currency,
    #[serde(rename = "type")]
    CallType,
}

impl CdrField {
    /// Number of columns a well-formed line carries.
    pub const COUNT: usize = 9;

    pub fn name(&self) -> &'static str {
        match self {
            CdrField::CallerId => "caller_id",
            CdrField::Recipient => "recipient",
            CdrField::CallDate => "call_date",
            CdrField::EndTime => "end_time",
            CdrField::Duration => "duration",
            CdrField::Cost => "cost",
            CdrField::Reference => "reference",
            CdrField::Currency => "currency",
            CdrField::CallType => "type",
        }
    }
}

impl fmt::Display for CdrField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of the count/duration aggregate over a date window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CallSummary {
    pub count: usize,
    #[serde(rename = "totalDuration")]
    pub total_duration: f64,
}

/// Ingestion statistics for one file or a whole load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub files: usize,
    /// Lines after the header, including blank and short ones.
    pub lines: usize,
    pub records: usize,
    #[serde(rename = "blankLines")]
    pub blank_lines: usize,
    #[serde(rename = "shortLines")]
    pub short_lines: usize,
    /// Records admitted with at least one sentinel field.
    #[serde(rename = "degradedRecords")]
    pub degraded_records: usize,
    /// Sentinel substitutions per column.
    #[serde(rename = "fieldFaults")]
    pub field_faults: BTreeMap<CdrField, usize>,
}

impl LoadReport {
    pub fn skipped_lines(&self) -> usize {
        self.blank_lines + self.short_lines
    }

    pub fn degraded_fields(&self) -> usize {
        self.field_faults.values().sum()
    }

    pub fn record_faults(&mut self, faults: impl IntoIterator<Item = CdrField>) {
        let mut any = false;
        for field in faults {
            *self.field_faults.entry(field).or_insert(0) += 1;
            any = true;
        }
        if any {
            self.degraded_records += 1;
        }
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: LoadReport) {
        self.files += other.files;
        self.lines += other.lines;
        self.records += other.records;
        self.blank_lines += other.blank_lines;
        self.short_lines += other.short_lines;
        self.degraded_records += other.degraded_records;
        for (field, count) in other.field_faults {
            *self.field_faults.entry(field).or_insert(0) += count;
        }
    }
}

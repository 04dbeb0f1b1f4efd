use crate::models::CallType;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};

/// Day/month/year, as written by the CDR exports.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// Hour:minute:second, 24-hour clock.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Converts single CDR columns into typed values
pub struct FieldParser;

impl FieldParser {
    /// Parse a `dd/MM/yyyy` call date
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .with_context(|| format!("Failed to parse call date: {:?}", value))
    }

    /// Parse an `HH:mm:ss` time of day. No date is attached.
    pub fn parse_time(value: &str) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
            .with_context(|| format!("Failed to parse end time: {:?}", value))
    }

    /// Parse a duration or cost. Negative and non-finite values are rejected.
    pub fn parse_amount(value: &str) -> Result<f64> {
        let amount: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse amount: {:?}", value))?;

        if !amount.is_finite() {
            anyhow::bail!("Amount is not finite: {:?}", value)
        }
        if amount < 0.0 {
            anyhow::bail!("Amount is negative: {:?}", value)
        }

        // -0.0 parses fine; keep sums and comparisons clean
        Ok(amount.abs())
    }

    /// Parse the categorical `type` column
    pub fn parse_call_type(value: &str) -> Result<CallType> {
        match CallType::parse(value) {
            Some(call_type) => Ok(call_type),
            None => anyhow::bail!("Unknown call type: {:?}", value),
        }
    }
}

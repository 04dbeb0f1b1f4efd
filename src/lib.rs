//! CDR Store Library
//!
//! A read-only query engine over call-detail records (CDRs) exported as flat
//! comma-separated files. All files in a directory are loaded once into an
//! immutable in-memory snapshot, which then answers four queries:
//!
//! - lookup by call reference
//! - call count and total duration over a date window
//! - a caller's calls within a date window
//! - a caller's most expensive calls within a date window
//!
//! ## Architecture Overview
//!
//! - [`models`] - Record, call type, aggregate and load report types
//! - [`field_parser`] - Per-column conversion (dates, times, amounts, call type)
//! - [`parser`] - Fault-tolerant line and file parsing
//! - [`file_discovery`] - Locating source files in the data directory
//! - [`store`] - The loaded snapshot ([`RecordStore`])
//! - [`query`] - The four queries ([`QueryEngine`])
//! - [`config`] - Configuration with file and environment support
//! - [`logging`] - `tracing` subscriber setup
//! - [`display`] - Text and JSON rendering for the CLI
//! - [`error`] - Fatal load errors
//!
//! ## Fault tolerance
//!
//! A column that cannot be parsed is replaced by a sentinel (zero, the
//! earliest date or time, or [`CallType::None`]) and the record is kept. Only
//! lines with fewer than nine columns are dropped. Both are counted in the
//! store's [`LoadReport`]. A missing data directory is fatal.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cdr_store::{QueryEngine, RecordStore};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = Arc::new(RecordStore::load("data")?);
//! let engine = QueryEngine::new(store);
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//!
//! let summary = engine.get_call_count_and_total_duration(start, end);
//! let top = engine.get_most_expensive_calls("441215598896", start, end, 3);
//! println!("{} calls, top cost {:?}", summary.count, top.first().map(|r| r.cost));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod field_parser;
pub mod file_discovery;
pub mod logging;
pub mod models;
pub mod parser;
pub mod query;
pub mod store;

pub use error::StoreError;
pub use models::*;
pub use query::{DateRange, QueryEngine};
pub use store::RecordStore;

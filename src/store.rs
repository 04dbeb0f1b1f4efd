//! Record Store
//!
//! Loads every CDR export in a directory once, eagerly, and holds the result
//! as an immutable snapshot for the life of the process.
//!
//! ## Ordering
//!
//! Files are read in lexicographic path order and lines in file order, so the
//! snapshot order is `(file, line)`. Queries that preserve "load order" mean
//! this order.
//!
//! ## Sharing
//!
//! The snapshot is an `Arc<[CallDetailRecord]>`. Cloning the handle is cheap
//! and every clone sees the same data; nothing can mutate it after load, so
//! any number of threads may read it without locking.
//!
//! ## Faults
//!
//! Missing directories and I/O errors abort the load with a [`StoreError`].
//! Bad field values never do: they are replaced by sentinels and counted in the
//! store's [`LoadReport`].

use crate::error::Result;
use crate::file_discovery::FileDiscovery;
use crate::models::{CallDetailRecord, LoadReport};
use crate::parser::CdrParser;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[CallDetailRecord]>,
    report: LoadReport,
    source_directory: Option<PathBuf>,
}

impl RecordStore {
    /// Load all `*.csv` files in `directory`.
    pub fn load(directory: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(directory, &FileDiscovery::default())
    }

    /// Load using a custom discovery (e.g. a different extension).
    pub fn load_with(directory: impl AsRef<Path>, discovery: &FileDiscovery) -> Result<Self> {
        let directory = directory.as_ref();
        let load_id = Uuid::new_v4();
        let span = info_span!("load", load_id = %load_id, directory = %directory.display());
        let _enter = span.enter();

        let files = discovery.find_source_files(directory)?;
        if files.is_empty() {
            warn!(
                extension = discovery.extension(),
                "No source files found, store will be empty"
            );
        }

        let parsed = Self::parse_files(&files)?;

        // Concatenate in file order
        let mut records = Vec::with_capacity(parsed.iter().map(|(r, _)| r.len()).sum());
        let mut report = LoadReport::default();
        for (file_records, file_report) in parsed {
            records.extend(file_records);
            report.merge(file_report);
        }

        info!(
            files = report.files,
            records = report.records,
            skipped_lines = report.skipped_lines(),
            degraded_records = report.degraded_records,
            degraded_fields = report.degraded_fields(),
            "Record store loaded"
        );
        if report.degraded_records > 0 {
            warn!(
                degraded_records = report.degraded_records,
                field_faults = ?report.field_faults,
                "Some fields could not be parsed and hold sentinel values"
            );
        }

        Ok(Self {
            records: records.into(),
            report,
            source_directory: Some(directory.to_path_buf()),
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn parse_files(files: &[PathBuf]) -> Result<Vec<(Vec<CallDetailRecord>, LoadReport)>> {
        let parser = CdrParser::new();
        files.iter().map(|file| parser.parse_file(file)).collect()
    }

    #[cfg(feature = "parallel")]
    fn parse_files(files: &[PathBuf]) -> Result<Vec<(Vec<CallDetailRecord>, LoadReport)>> {
        let parser = CdrParser::new();
        // Indexed collect keeps enumeration order
        files.par_iter().map(|file| parser.parse_file(file)).collect()
    }

    /// Build a store from records already in memory.
    pub fn from_records(records: Vec<CallDetailRecord>) -> Self {
        let report = LoadReport {
            records: records.len(),
            lines: records.len(),
            ..Default::default()
        };
        Self {
            records: records.into(),
            report,
            source_directory: None,
        }
    }

    /// The full snapshot, in load order.
    pub fn records(&self) -> &[CallDetailRecord] {
        &self.records
    }

    /// Shared handle to the full snapshot.
    pub fn get_all(&self) -> Arc<[CallDetailRecord]> {
        Arc::clone(&self.records)
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn source_directory(&self) -> Option<&Path> {
        self.source_directory.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

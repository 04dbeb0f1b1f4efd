//! Query Engine
//!
//! Read-only operations over a [`RecordStore`] snapshot. Every query is a
//! linear scan; none allocate beyond their result and none mutate anything, so
//! a single [`QueryEngine`] can be shared across threads.
//!
//! Date windows are inclusive at both ends and compare the call date only;
//! the end time never participates in filtering.

use crate::models::{CallDetailRecord, CallSummary};
use crate::store::RecordStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Inclusive calendar-date window. A window whose start is after its end is
/// valid and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<RecordStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// First record (in load order) whose reference matches exactly.
    pub fn get_by_reference(&self, reference: &str) -> Option<&CallDetailRecord> {
        self.store
            .records()
            .iter()
            .find(|record| record.reference == reference)
    }

    /// Every record whose call date falls inside `[start, end]`, in load order.
    pub fn get_cdrs_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&CallDetailRecord> {
        self.in_range(DateRange::new(start, end)).collect()
    }

    /// Number of calls in `[start, end]` and their summed duration.
    pub fn get_call_count_and_total_duration(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CallSummary {
        let summary = self
            .in_range(DateRange::new(start, end))
            .fold(CallSummary::default(), |mut acc, record| {
                acc.count += 1;
                acc.total_duration += record.duration;
                acc
            });

        debug!(
            %start,
            %end,
            count = summary.count,
            total_duration = summary.total_duration,
            "Computed call summary"
        );
        summary
    }

    /// Calls made by `caller_id` in `[start, end]`, in load order.
    pub fn get_cdrs_by_caller_id(
        &self,
        caller_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&CallDetailRecord> {
        self.in_range(DateRange::new(start, end))
            .filter(|record| record.caller_id == caller_id)
            .collect()
    }

    /// Up to `count` of the caller's calls in `[start, end]`, most expensive
    /// first. Calls with equal cost keep their load order.
    pub fn get_most_expensive_calls(
        &self,
        caller_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        count: usize,
    ) -> Vec<&CallDetailRecord> {
        if count == 0 {
            return Vec::new();
        }

        let mut calls: Vec<&CallDetailRecord> = self
            .in_range(DateRange::new(start, end))
            .filter(|record| record.caller_id == caller_id)
            .collect();

        // Stable sort: ties stay in load order
        calls.sort_by(|a, b| b.cost.total_cmp(&a.cost));
        calls.truncate(count);
        calls
    }

    fn in_range(&self, range: DateRange) -> impl Iterator<Item = &CallDetailRecord> + '_ {
        self.store
            .records()
            .iter()
            .filter(move |record| range.contains(record.call_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CallType;
    use chrono::NaiveTime;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn record(caller: &str, day: u32, duration: f64, cost: f64, reference: &str) -> CallDetailRecord {
        CallDetailRecord {
            caller_id: caller.to_string(),
            recipient: "R".to_string(),
            call_date: date(day),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            duration,
            cost,
            reference: reference.to_string(),
            currency: "GBP".to_string(),
            call_type: CallType::Domestic,
        }
    }

    fn engine(records: Vec<CallDetailRecord>) -> QueryEngine {
        QueryEngine::new(Arc::new(RecordStore::from_records(records)))
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(date(2), date(4));
        assert!(!range.contains(date(1)));
        assert!(range.contains(date(2)));
        assert!(range.contains(date(4)));
        assert!(!range.contains(date(5)));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let range = DateRange::new(date(4), date(2));
        assert!(range.is_empty());
        assert!(!range.contains(date(3)));

        let engine = engine(vec![record("A", 3, 10.0, 1.0, "R1")]);
        let summary = engine.get_call_count_and_total_duration(date(4), date(2));
        assert_eq!(summary, CallSummary::default());
    }

    #[test]
    fn test_get_by_reference_returns_first_duplicate() {
        let engine = engine(vec![
            record("A", 1, 10.0, 1.0, "DUP"),
            record("B", 2, 20.0, 2.0, "DUP"),
        ]);

        let found = engine.get_by_reference("DUP").unwrap();
        assert_eq!(found.caller_id, "A");
        assert!(engine.get_by_reference("dup").is_none());
        assert!(engine.get_by_reference("MISSING").is_none());
    }

    #[test]
    fn test_summary_counts_boundaries() {
        let engine = engine(vec![
            record("A", 1, 10.0, 1.0, "R1"),
            record("A", 2, 20.0, 1.0, "R2"),
            record("B", 3, 30.0, 1.0, "R3"),
            record("B", 4, 40.0, 1.0, "R4"),
        ]);

        let summary = engine.get_call_count_and_total_duration(date(2), date(3));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_duration, 50.0);
        assert_eq!(
            summary.count,
            engine.get_cdrs_by_date_range(date(2), date(3)).len()
        );
    }

    #[test]
    fn test_summary_over_empty_window() {
        let engine = engine(vec![record("A", 1, 10.0, 1.0, "R1")]);
        let summary = engine.get_call_count_and_total_duration(date(10), date(20));
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_duration, 0.0);
    }

    #[test]
    fn test_by_caller_preserves_load_order() {
        let engine = engine(vec![
            record("A", 3, 1.0, 5.0, "R1"),
            record("B", 2, 1.0, 1.0, "R2"),
            record("A", 1, 1.0, 9.0, "R3"),
            record("A", 9, 1.0, 9.0, "R4"),
        ]);

        let refs: Vec<&str> = engine
            .get_cdrs_by_caller_id("A", date(1), date(5))
            .iter()
            .map(|r| r.reference.as_str())
            .collect();
        assert_eq!(refs, vec!["R1", "R3"]);
    }

    #[test]
    fn test_most_expensive_sorted_and_truncated() {
        let engine = engine(vec![
            record("A", 1, 1.0, 2.0, "R1"),
            record("A", 1, 1.0, 7.5, "R2"),
            record("A", 2, 1.0, 0.5, "R3"),
            record("B", 2, 1.0, 99.0, "R4"),
        ]);

        let top = engine.get_most_expensive_calls("A", date(1), date(2), 2);
        let refs: Vec<&str> = top.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, vec!["R2", "R1"]);
    }

    #[test]
    fn test_most_expensive_ties_keep_load_order() {
        let engine = engine(vec![
            record("A", 1, 1.0, 3.0, "FIRST"),
            record("A", 1, 1.0, 5.0, "TOP"),
            record("A", 2, 1.0, 3.0, "SECOND"),
            record("A", 2, 1.0, 3.0, "THIRD"),
        ]);

        let top = engine.get_most_expensive_calls("A", date(1), date(2), 10);
        let refs: Vec<&str> = top.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, vec!["TOP", "FIRST", "SECOND", "THIRD"]);
    }

    #[test]
    fn test_most_expensive_zero_count() {
        let engine = engine(vec![record("A", 1, 1.0, 3.0, "R1")]);
        assert!(engine
            .get_most_expensive_calls("A", date(1), date(1), 0)
            .is_empty());
    }

    #[test]
    fn test_most_expensive_no_matches() {
        let engine = engine(vec![record("A", 1, 1.0, 3.0, "R1")]);
        assert!(engine
            .get_most_expensive_calls("Z", date(1), date(1), 3)
            .is_empty());
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        let engine = Arc::new(engine(vec![
            record("A", 1, 10.0, 1.0, "R1"),
            record("A", 2, 20.0, 2.0, "R2"),
        ]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    engine
                        .get_call_count_and_total_duration(date(1), date(2))
                        .count
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}

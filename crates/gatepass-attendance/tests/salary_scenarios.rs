//! End-to-end salary scenarios over an in-memory attendance source.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use gatepass_attendance::{
    AttendanceEvent, AttendanceSource, DateRange, PairingPolicy, SalaryCalculator,
    compute_breakdown, compute_breakdown_with, default_late_threshold,
};
use gatepass_core::{Direction, Error, Result};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// In-memory source
// ============================================================================

#[derive(Default)]
struct MemorySource {
    events: HashMap<u64, Vec<AttendanceEvent>>,
    unavailable: bool,
}

impl MemorySource {
    fn with(mut self, employee_id: u64, events: Vec<AttendanceEvent>) -> Self {
        self.events.insert(employee_id, events);
        self
    }
}

impl AttendanceSource for MemorySource {
    async fn attendance_events(
        &self,
        employee_id: u64,
        range: &DateRange,
    ) -> Result<Vec<AttendanceEvent>> {
        if self.unavailable {
            return Err(Error::RemoteUnavailable("source offline".into()));
        }
        Ok(self
            .events
            .get(&employee_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| range.contains(e.date()))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn march() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
    )
    .unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_two_complete_days_at_twenty_per_hour() {
    let source = MemorySource::default().with(
        3,
        vec![
            AttendanceEvent::sign_in(at(3, 8, 0)),
            AttendanceEvent::sign_out(at(3, 17, 30)),
            AttendanceEvent::sign_in(at(4, 9, 0)),
            AttendanceEvent::sign_out(at(4, 17, 0)),
        ],
    );
    let calculator = SalaryCalculator::new(source);

    let report = calculator.calculate(3, 20.0, march()).await.unwrap();

    assert_eq!(report.total_days_worked, 2);
    assert_eq!(report.total_hours, 17.5);
    assert_eq!(report.salary, 350.0);
    assert_eq!(report.breakdown.len(), 2);
}

#[tokio::test]
async fn test_incomplete_day_counts_no_hours() {
    let source = MemorySource::default().with(
        3,
        vec![
            AttendanceEvent::sign_in(at(3, 8, 0)),
            AttendanceEvent::sign_out(at(3, 16, 0)),
            AttendanceEvent::sign_in(at(4, 8, 0)),
        ],
    );
    let report = SalaryCalculator::new(source)
        .calculate(3, 10.0, march())
        .await
        .unwrap();

    assert_eq!(report.total_days_worked, 1);
    assert_eq!(report.total_hours, 8.0);
    assert_eq!(report.incomplete_days(), 1);
    assert!(report.breakdown[1].incomplete);
}

#[tokio::test]
async fn test_multi_shift_policy() {
    let source = MemorySource::default().with(
        3,
        vec![
            AttendanceEvent::sign_in(at(3, 8, 0)),
            AttendanceEvent::sign_out(at(3, 12, 0)),
            AttendanceEvent::sign_in(at(3, 13, 0)),
            AttendanceEvent::sign_out(at(3, 17, 0)),
        ],
    );
    let source = Arc::new(source);
    let single = SalaryCalculator::new(Arc::clone(&source));
    let stacked = SalaryCalculator::new(source).with_policy(PairingPolicy::StackedShifts);

    assert_eq!(single.calculate(3, 10.0, march()).await.unwrap().salary, 40.0);
    assert_eq!(stacked.calculate(3, 10.0, march()).await.unwrap().salary, 80.0);
}

#[tokio::test]
async fn test_unknown_employee_has_empty_report() {
    let report = SalaryCalculator::new(MemorySource::default())
        .calculate(99, 20.0, march())
        .await
        .unwrap();

    assert!(report.breakdown.is_empty());
    assert_eq!(report.salary, 0.0);
}

#[tokio::test]
async fn test_source_error_propagates() {
    let source = MemorySource {
        unavailable: true,
        ..Default::default()
    };
    let result = SalaryCalculator::new(source).calculate(3, 20.0, march()).await;
    assert_eq!(
        result,
        Err(Error::RemoteUnavailable("source offline".into()))
    );
}

#[tokio::test]
async fn test_negative_rate_rejected_after_fetch() {
    let result = SalaryCalculator::new(MemorySource::default())
        .calculate(3, -5.0, march())
        .await;
    assert!(matches!(result, Err(Error::InvalidRate(_))));
}

#[tokio::test]
async fn test_late_arrivals_through_calculator() {
    let source = MemorySource::default().with(
        3,
        vec![
            AttendanceEvent::sign_in(at(3, 9, 5)),
            AttendanceEvent::sign_in(at(4, 9, 25)),
            AttendanceEvent::sign_out(at(4, 17, 0)),
        ],
    );
    let late = SalaryCalculator::new(source)
        .late_arrivals(3, march(), default_late_threshold())
        .await
        .unwrap();

    assert_eq!(late.len(), 1);
    assert_eq!(late[0].sign_in, NaiveTime::from_hms_opt(9, 25, 0).unwrap());
    assert_eq!(late[0].minutes_late, 15);
}

// ============================================================================
// Properties
// ============================================================================

/// Strategy for a day's worth of scans at distinct minutes.
fn day_of_scans() -> impl Strategy<Value = Vec<(u32, bool)>> {
    prop::collection::btree_map(0u32..24 * 60, any::<bool>(), 0..12)
        .prop_map(|scans| scans.into_iter().collect())
}

fn to_events(day: u32, scans: &[(u32, bool)]) -> Vec<AttendanceEvent> {
    scans
        .iter()
        .map(|&(minute, is_in)| {
            let direction = if is_in { Direction::In } else { Direction::Out };
            AttendanceEvent::new(at(day, minute / 60, minute % 60), direction)
        })
        .collect()
}

proptest! {
    /// Hours are never negative, and a single pair never exceeds one day.
    #[test]
    fn prop_hours_bounded(scans in day_of_scans()) {
        let events = to_events(4, &scans);
        for entry in compute_breakdown_with(&events, &march(), PairingPolicy::FirstPairPerDay) {
            prop_assert!((0.0..24.0).contains(&entry.hours));
        }
        for entry in compute_breakdown_with(&events, &march(), PairingPolicy::StackedShifts) {
            prop_assert!(entry.hours >= 0.0);
        }
    }

    /// One entry iff the date has any scans.
    #[test]
    fn prop_entry_only_for_days_with_scans(scans in day_of_scans()) {
        let entries = compute_breakdown(&to_events(4, &scans), &march());
        prop_assert_eq!(entries.len(), usize::from(!scans.is_empty()));
    }

    /// Incomplete entries contribute zero hours under the default policy.
    #[test]
    fn prop_incomplete_means_zero_hours(scans in day_of_scans()) {
        for entry in compute_breakdown(&to_events(4, &scans), &march()) {
            if entry.incomplete {
                prop_assert_eq!(entry.hours, 0.0);
            }
        }
    }

    /// Input order does not change the result.
    #[test]
    fn prop_order_independent(scans in day_of_scans()) {
        let events = to_events(4, &scans);
        let mut reversed = events.clone();
        reversed.reverse();

        let forward = compute_breakdown(&events, &march());
        let backward = compute_breakdown(&reversed, &march());
        prop_assert_eq!(forward.len(), backward.len());
        for (a, b) in forward.iter().zip(&backward) {
            prop_assert_eq!(a.hours, b.hours);
            prop_assert_eq!(a.incomplete, b.incomplete);
        }
    }
}

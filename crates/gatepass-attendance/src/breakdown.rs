//! Daily breakdown of worked hours.
//!
//! Events are grouped by local calendar date, sorted by time within each
//! date (stable, so equal timestamps keep their input order) and paired into
//! one [`DailyBreakdownEntry`] per date that has events.
//!
//! # Pairing Policies
//!
//! - [`PairingPolicy::FirstPairPerDay`] (default): the first sign-in is paired
//!   with the next sign-out after it. Everything else on that date is ignored.
//! - [`PairingPolicy::StackedShifts`]: every sign-out closes the most recent
//!   open sign-in and the hours of all pairs are summed.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use gatepass_attendance::{AttendanceEvent, DateRange, compute_breakdown};
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
//! let events = [
//!     AttendanceEvent::sign_in(day.and_hms_opt(8, 0, 0).unwrap()),
//!     AttendanceEvent::sign_out(day.and_hms_opt(17, 30, 0).unwrap()),
//! ];
//!
//! let entries = compute_breakdown(&events, &DateRange::new(day, day).unwrap());
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].hours, 9.5);
//! assert!(entries[0].is_complete());
//! ```

use crate::types::{AttendanceEvent, DailyBreakdownEntry, DateRange};
use chrono::{NaiveDate, NaiveDateTime};
use gatepass_core::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// How sign-ins and sign-outs on one date are paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// One shift per day: first sign-in to the next sign-out.
    #[default]
    FirstPairPerDay,
    /// Multiple shifts per day, each sign-out closing the latest open sign-in.
    StackedShifts,
}

/// Compute the breakdown with the default pairing policy.
pub fn compute_breakdown(events: &[AttendanceEvent], range: &DateRange) -> Vec<DailyBreakdownEntry> {
    compute_breakdown_with(events, range, PairingPolicy::default())
}

/// Compute one entry per date in `range` that has events, ordered by date.
pub fn compute_breakdown_with(
    events: &[AttendanceEvent],
    range: &DateRange,
    policy: PairingPolicy,
) -> Vec<DailyBreakdownEntry> {
    let mut by_date: BTreeMap<NaiveDate, Vec<AttendanceEvent>> = BTreeMap::new();
    for event in events.iter().filter(|e| range.contains(e.date())) {
        by_date.entry(event.date()).or_default().push(*event);
    }

    by_date
        .into_iter()
        .map(|(date, mut day)| {
            day.sort_by_key(|e| e.timestamp);
            let entry = match policy {
                PairingPolicy::FirstPairPerDay => first_pair(date, &day),
                PairingPolicy::StackedShifts => stacked(date, &day),
            };
            trace!(%date, hours = entry.hours, incomplete = entry.incomplete, "Paired day");
            entry
        })
        .collect()
}

fn first_pair(date: NaiveDate, day: &[AttendanceEvent]) -> DailyBreakdownEntry {
    let first_in = day.iter().position(|e| e.direction.is_in());

    let Some(in_idx) = first_in else {
        // Only sign-outs on this date
        return DailyBreakdownEntry {
            date,
            sign_in: None,
            sign_out: day.first().map(|e| e.timestamp.time()),
            hours: 0.0,
            incomplete: true,
        };
    };

    let sign_in = day[in_idx].timestamp;
    let sign_out = day[in_idx + 1..]
        .iter()
        .find(|e| e.direction.is_out())
        .map(|e| e.timestamp);

    match sign_out {
        Some(sign_out) => DailyBreakdownEntry {
            date,
            sign_in: Some(sign_in.time()),
            sign_out: Some(sign_out.time()),
            hours: hours_between(sign_in, sign_out),
            incomplete: false,
        },
        None => DailyBreakdownEntry {
            date,
            sign_in: Some(sign_in.time()),
            sign_out: None,
            hours: 0.0,
            incomplete: true,
        },
    }
}

fn stacked(date: NaiveDate, day: &[AttendanceEvent]) -> DailyBreakdownEntry {
    let mut open: Vec<NaiveDateTime> = Vec::new();
    let mut hours = 0.0;
    let mut earliest_in: Option<NaiveDateTime> = None;
    let mut latest_out: Option<NaiveDateTime> = None;
    let mut unmatched_out = false;

    for event in day {
        match event.direction {
            Direction::In => open.push(event.timestamp),
            Direction::Out => match open.pop() {
                Some(sign_in) => {
                    hours += hours_between(sign_in, event.timestamp);
                    earliest_in = Some(earliest_in.map_or(sign_in, |t| t.min(sign_in)));
                    latest_out = Some(latest_out.map_or(event.timestamp, |t| t.max(event.timestamp)));
                }
                None => unmatched_out = true,
            },
        }
    }

    // With no matched pair, fall back to the first event of each direction
    let sign_in = earliest_in.or_else(|| first_of(day, Direction::In));
    let sign_out = latest_out.or_else(|| first_of(day, Direction::Out));

    DailyBreakdownEntry {
        date,
        sign_in: sign_in.map(|t| t.time()),
        sign_out: sign_out.map(|t| t.time()),
        hours,
        incomplete: unmatched_out || !open.is_empty(),
    }
}

fn first_of(day: &[AttendanceEvent], direction: Direction) -> Option<NaiveDateTime> {
    day.iter()
        .find(|e| e.direction == direction)
        .map(|e| e.timestamp)
}

fn hours_between(sign_in: NaiveDateTime, sign_out: NaiveDateTime) -> f64 {
    ((sign_out - sign_in).num_milliseconds() as f64 / MILLIS_PER_HOUR).max(0.0)
}

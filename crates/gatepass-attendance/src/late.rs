//! Late arrival detection.

use crate::types::DailyBreakdownEntry;
use chrono::{NaiveDate, NaiveTime};
use gatepass_core::constants::{LATE_THRESHOLD_HOUR, LATE_THRESHOLD_MINUTE};
use serde::{Deserialize, Serialize};

/// A date whose sign-in came after the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateArrival {
    pub date: NaiveDate,
    pub sign_in: NaiveTime,
    pub minutes_late: i64,
}

/// Default threshold, 09:10 local time.
pub fn default_late_threshold() -> NaiveTime {
    NaiveTime::from_hms_opt(LATE_THRESHOLD_HOUR, LATE_THRESHOLD_MINUTE, 0).unwrap_or_default()
}

/// Entries whose sign-in is strictly after `threshold`, in input order.
pub fn late_arrivals(entries: &[DailyBreakdownEntry], threshold: NaiveTime) -> Vec<LateArrival> {
    entries
        .iter()
        .filter_map(|entry| {
            let sign_in = entry.sign_in?;
            (sign_in > threshold).then(|| LateArrival {
                date: entry.date,
                sign_in,
                minutes_late: (sign_in - threshold).num_minutes(),
            })
        })
        .collect()
}

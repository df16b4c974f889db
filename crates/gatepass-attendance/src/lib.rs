//! Attendance aggregation for gatepass employees.
//!
//! Turns raw sign-in/sign-out scans into a per-day breakdown of worked hours
//! and a salary report. The arithmetic is pure; [`SalaryCalculator`] adds the
//! fetch from an [`AttendanceSource`].

pub mod breakdown;
pub mod late;
pub mod salary;
pub mod source;
pub mod types;

pub use breakdown::{PairingPolicy, compute_breakdown, compute_breakdown_with};
pub use late::{LateArrival, default_late_threshold, late_arrivals};
pub use salary::SalaryReport;
pub use source::{AttendanceSource, SalaryCalculator};
pub use types::{AttendanceEvent, DailyBreakdownEntry, DateRange};

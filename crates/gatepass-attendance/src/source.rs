//! Attendance event sources and the salary calculator built on them.

use crate::breakdown::{PairingPolicy, compute_breakdown_with};
use crate::late::{LateArrival, late_arrivals};
use crate::salary::SalaryReport;
use crate::types::{AttendanceEvent, DateRange};
use chrono::NaiveTime;
use gatepass_core::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Supplies the raw scan history of an employee.
pub trait AttendanceSource: Send + Sync {
    /// Events for `employee_id` within `range`, in any order.
    fn attendance_events(
        &self,
        employee_id: u64,
        range: &DateRange,
    ) -> impl Future<Output = Result<Vec<AttendanceEvent>>> + Send;
}

impl<S: AttendanceSource> AttendanceSource for Arc<S> {
    fn attendance_events(
        &self,
        employee_id: u64,
        range: &DateRange,
    ) -> impl Future<Output = Result<Vec<AttendanceEvent>>> + Send {
        (**self).attendance_events(employee_id, range)
    }
}

/// Fetches events from a source and turns them into salary reports.
#[derive(Debug)]
pub struct SalaryCalculator<S> {
    source: S,
    policy: PairingPolicy,
}

impl<S: AttendanceSource> SalaryCalculator<S> {
    /// Calculator using the default single-pair policy.
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: PairingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PairingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> PairingPolicy {
        self.policy
    }

    /// Fetch and aggregate one employee's attendance.
    ///
    /// # Errors
    /// Propagates source errors and `Error::InvalidRate`.
    pub async fn calculate(
        &self,
        employee_id: u64,
        hourly_rate: f64,
        range: DateRange,
    ) -> Result<SalaryReport> {
        let events = self.source.attendance_events(employee_id, &range).await?;
        debug!(employee_id, events = events.len(), %range, "Fetched attendance");

        let breakdown = compute_breakdown_with(&events, &range, self.policy);
        let report = SalaryReport::from_breakdown(employee_id, hourly_rate, range, breakdown)?;

        info!(
            employee_id,
            days = report.total_days_worked,
            hours = report.total_hours,
            salary = report.salary,
            "Salary calculated"
        );
        Ok(report)
    }

    /// Fetch one employee's attendance and list late sign-ins.
    pub async fn late_arrivals(
        &self,
        employee_id: u64,
        range: DateRange,
        threshold: NaiveTime,
    ) -> Result<Vec<LateArrival>> {
        let events = self.source.attendance_events(employee_id, &range).await?;
        let breakdown = compute_breakdown_with(&events, &range, self.policy);
        Ok(late_arrivals(&breakdown, threshold))
    }
}

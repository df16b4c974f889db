use crate::types::{DailyBreakdownEntry, DateRange};
use gatepass_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Worked days, hours and pay for one employee over a date range.
///
/// Totals are kept at full precision. Use [`rounded_hours`](Self::rounded_hours)
/// and [`rounded_salary`](Self::rounded_salary) for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryReport {
    pub employee_id: u64,
    pub employee_name: Option<String>,
    pub range: DateRange,
    pub hourly_rate: f64,
    pub total_days_worked: usize,
    pub total_hours: f64,
    pub salary: f64,
    pub breakdown: Vec<DailyBreakdownEntry>,
}

impl SalaryReport {
    /// Build a report from a computed breakdown.
    ///
    /// # Errors
    /// Returns `Error::InvalidRate` if `hourly_rate` is negative or not finite.
    pub fn from_breakdown(
        employee_id: u64,
        hourly_rate: f64,
        range: DateRange,
        breakdown: Vec<DailyBreakdownEntry>,
    ) -> Result<Self> {
        if !hourly_rate.is_finite() || hourly_rate < 0.0 {
            return Err(Error::InvalidRate(hourly_rate.to_string()));
        }

        let total_days_worked = breakdown.iter().filter(|e| e.is_complete()).count();
        let total_hours: f64 = breakdown.iter().map(|e| e.hours).sum();

        Ok(Self {
            employee_id,
            employee_name: None,
            range,
            hourly_rate,
            total_days_worked,
            total_hours,
            salary: total_hours * hourly_rate,
            breakdown,
        })
    }

    pub fn with_employee_name(mut self, name: impl Into<String>) -> Self {
        self.employee_name = Some(name.into());
        self
    }

    /// Total hours rounded to two decimals.
    pub fn rounded_hours(&self) -> f64 {
        round2(self.total_hours)
    }

    /// Salary rounded to two decimals.
    pub fn rounded_salary(&self) -> f64 {
        round2(self.salary)
    }

    /// Days with at least one incomplete record.
    pub fn incomplete_days(&self) -> usize {
        self.breakdown.iter().filter(|e| e.incomplete).count()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl fmt::Display for SalaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.employee_name {
            Some(name) => write!(f, "{name} (#{})", self.employee_id)?,
            None => write!(f, "Employee #{}", self.employee_id)?,
        }
        write!(
            f,
            ", {}: {} days, {:.2} h at {:.2}/h = {:.2}",
            self.range,
            self.total_days_worked,
            self.total_hours,
            self.hourly_rate,
            self.salary
        )
    }
}

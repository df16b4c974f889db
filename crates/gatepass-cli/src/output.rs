//! Plain-text rendering of command results.

use gatepass_attendance::{LateArrival, SalaryReport};
use gatepass_checkpoint::{
    AttendanceScan, CheckEvent, CheckpointOutcome, SignedInRoster, VerificationResult,
};
use std::fmt::Write;

pub fn outcome(outcome: &CheckpointOutcome) -> String {
    match outcome {
        CheckpointOutcome::Verified(result) => verification(result),
        CheckpointOutcome::Checked(event) => check_event(event),
        CheckpointOutcome::Attendance(scan) => attendance(scan),
    }
}

fn verification(result: &VerificationResult) -> String {
    let mut out = format!("{} {}", result.subject_type, result.status);
    if let Some(id) = result.subject_id {
        let _ = write!(out, " #{id}");
    }
    if let Some(name) = &result.name {
        let _ = write!(out, " {name}");
    }
    if let Some(expiry) = &result.expiry_date {
        let _ = write!(out, " (expires {expiry})");
    }
    if let Some(message) = &result.message {
        let _ = write!(out, "\n{message}");
    }
    out
}

fn check_event(event: &CheckEvent) -> String {
    let action = match (event.direction.is_in(), event.admitted) {
        (true, true) => "Checked in",
        (true, false) => "Check-in refused",
        (false, _) => "Checked out",
    };
    let who = event.name.as_deref().unwrap_or("unknown visitor");

    let mut out = format!("{action}: {who} at {}", event.timestamp.format("%H:%M:%S"));
    if let Some(message) = event.alert_message.as_deref().filter(|_| event.alert) {
        let _ = write!(out, "\n!! {message}");
    }
    out
}

fn attendance(scan: &AttendanceScan) -> String {
    let verb = if scan.direction.is_in() {
        "Signed in"
    } else {
        "Signed out"
    };
    format!(
        "{verb}: {} (#{}) at {}",
        scan.name.as_deref().unwrap_or("employee"),
        scan.employee_id,
        scan.time.format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn salary(report: &SalaryReport, late: &[LateArrival]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {:>8} {:>8} {:>7}", "Date", "In", "Out", "Hours");

    for entry in &report.breakdown {
        let time = |t: Option<chrono::NaiveTime>| {
            t.map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        let _ = writeln!(
            out,
            "{:<12} {:>8} {:>8} {:>7.2}{}",
            entry.date,
            time(entry.sign_in),
            time(entry.sign_out),
            entry.hours,
            if entry.incomplete { "  incomplete" } else { "" }
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{report}");
    if !late.is_empty() {
        let _ = writeln!(out, "Late arrivals: {}", late.len());
        for arrival in late {
            let _ = writeln!(
                out,
                "  {} at {} ({} min)",
                arrival.date,
                arrival.sign_in.format("%H:%M"),
                arrival.minutes_late
            );
        }
    }
    out
}

pub fn roster(roster: &SignedInRoster) -> String {
    let mut out = format!(
        "{} signed in as of {}\n",
        roster.len(),
        roster.fetched_at.format("%H:%M:%S")
    );
    for entry in &roster.employees {
        let _ = writeln!(
            out,
            "  #{:<5} {:<24} {:<16} {}",
            entry.employee_id,
            entry.name,
            entry.department.as_deref().unwrap_or("-"),
            entry
                .last_scan
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default()
        );
    }
    out
}

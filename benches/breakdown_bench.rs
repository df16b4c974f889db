//! Performance benchmarks for attendance aggregation.
//!
//! Measures how daily breakdown and salary aggregation scale with the number
//! of scans in a reporting window, for both pairing policies.
//!
//! # Run Benchmarks
//!
//! ```sh
//! # Run all breakdown benchmarks
//! cargo bench --bench breakdown_bench
//!
//! # Run one group
//! cargo bench --bench breakdown_bench -- pairing_policy
//!
//! # Compare against a saved baseline
//! cargo bench --bench breakdown_bench -- --save-baseline main
//! cargo bench --bench breakdown_bench -- --baseline main
//! ```

use chrono::{NaiveDate, TimeDelta};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gatepass_attendance::{
    AttendanceEvent, DateRange, PairingPolicy, SalaryReport, compute_breakdown_with,
};
use std::hint::black_box;

/// `days` of history with `shifts` in/out pairs per day, newest first.
fn history(days: i64, shifts: u32) -> (Vec<AttendanceEvent>, DateRange) {
    let end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    let range = DateRange::last_days(days - 1, end).unwrap();

    let mut events = Vec::new();
    for offset in 0..days {
        let date = end - TimeDelta::days(offset);
        for shift in 0..shifts {
            let start = 8 + shift * 4;
            events.push(AttendanceEvent::sign_in(date.and_hms_opt(start, 2, 0).unwrap()));
            events.push(AttendanceEvent::sign_out(
                date.and_hms_opt(start + 3, 47, 0).unwrap(),
            ));
        }
    }
    (events, range)
}

/// Breakdown cost over growing reporting windows.
fn bench_breakdown_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("breakdown_window");

    for days in [7, 30, 90, 365] {
        let (events, range) = history(days, 1);
        group.throughput(Throughput::Elements(events.len() as u64));

        group.bench_with_input(BenchmarkId::new("first_pair", days), &events, |b, events| {
            b.iter(|| {
                let entries =
                    compute_breakdown_with(black_box(events), &range, PairingPolicy::FirstPairPerDay);
                black_box(entries)
            });
        });
    }

    group.finish();
}

/// Policies compared on multi-shift days.
fn bench_pairing_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairing_policy");
    let (events, range) = history(30, 3);
    group.throughput(Throughput::Elements(events.len() as u64));

    for (name, policy) in [
        ("first_pair", PairingPolicy::FirstPairPerDay),
        ("stacked", PairingPolicy::StackedShifts),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(compute_breakdown_with(black_box(&events), &range, policy)));
        });
    }

    group.finish();
}

/// Full report from events, as the calculator does it.
fn bench_salary_report(c: &mut Criterion) {
    let (events, range) = history(30, 1);

    c.bench_function("salary_report_30_days", |b| {
        b.iter(|| {
            let entries =
                compute_breakdown_with(black_box(&events), &range, PairingPolicy::default());
            black_box(SalaryReport::from_breakdown(3, 20.0, range, entries))
        });
    });
}

criterion_group!(
    benches,
    bench_breakdown_window,
    bench_pairing_policy,
    bench_salary_report
);
criterion_main!(benches);

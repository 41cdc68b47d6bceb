//! Benchmarks for the week aggregation pipeline
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fitness_dashboard::analytics::{build_week_history_rows, build_weight_series, MetricKind};
use fitness_dashboard::export::{create_week_export_payload, serialize_week_export};
use fitness_dashboard::weeks::{DayMetrics, FitnessWeek, Weekday};

fn create_test_weeks(count: usize) -> Vec<FitnessWeek> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();

    // Stored in reverse so every run has to sort
    (0..count)
        .rev()
        .map(|i| {
            let week_of = (start + Duration::weeks(i as i64)).format("%Y-%m-%d").to_string();
            Weekday::ALL
                .into_iter()
                .enumerate()
                .filter(|(d, _)| (i + d) % 5 != 0)
                .fold(
                    FitnessWeek::new(week_of.clone(), week_of)
                        .avg_steps_per_day(8000.0 + (i % 7) as f64 * 250.0)
                        .total_sets(40.0 + (i % 3) as f64),
                    |week, (d, day)| {
                        week.day(
                            day,
                            DayMetrics::new()
                                .weight_kg(80.0 - (i as f64) * 0.01 + d as f64 * 0.1)
                                .calories(2400.0 + d as f64 * 50.0)
                                .protein_g(150.0),
                        )
                    },
                )
        })
        .collect()
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    for size in [52, 260, 520] {
        let weeks = create_test_weeks(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("rows", size), &weeks, |b, weeks| {
            b.iter(|| build_week_history_rows(black_box(weeks)))
        });

        group.bench_with_input(BenchmarkId::new("calories", size), &weeks, |b, weeks| {
            b.iter(|| MetricKind::Calories.history(black_box(weeks)))
        });
    }

    group.finish();
}

fn bench_weight_series(c: &mut Criterion) {
    let weeks = create_test_weeks(260);

    c.bench_function("weight_series_260", |b| {
        b.iter(|| build_weight_series(black_box(&weeks)))
    });
}

fn bench_export(c: &mut Criterion) {
    let weeks = create_test_weeks(260);
    let now = Utc.with_ymd_and_hms(2026, 2, 4, 10, 0, 0).unwrap();

    c.bench_function("export_260", |b| {
        b.iter(|| {
            let payload = create_week_export_payload(black_box(&weeks), &now);
            serialize_week_export(&payload).unwrap()
        })
    });
}

criterion_group!(benches, bench_history, bench_weight_series, bench_export);
criterion_main!(benches);

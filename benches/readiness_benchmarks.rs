use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use readyrs::models::{DailyMetrics, DateRange};
use readyrs::readiness::ReadinessCalculator;
use readyrs::trend::TrendAnalyzer;

/// Benchmarks for readiness scoring and trend analysis over growing windows

fn create_daily_series(days: u32) -> Vec<DailyMetrics> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    (0..days)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            // every fifth night without the watch
            let worn = i % 5 != 4;

            DailyMetrics {
                acute_load: Some(400.0 + (i % 30) as f64 * 10.0),
                acwr: Some(0.7 + (i % 10) as f64 * 0.08),
                sleep_hours: Some(5.5 + (i % 6) as f64 * 0.5),
                sleep_score: if i % 3 == 0 { None } else { Some(60 + (i % 35) as u8) },
                hrv_last_night: if worn { Some(40.0 + (i % 20) as f64) } else { None },
                hrv_weekly_avg: if i % 4 == 0 { None } else { Some(50.0) },
                resting_hr: Some(42 + (i % 12) as u16),
                body_battery_charged: Some(30 + (i % 60) as u8),
                body_battery_drained: Some(if worn { 45 } else { 0 }),
                ..DailyMetrics::new(date)
            }
        })
        .collect()
}

fn bench_assess(c: &mut Criterion) {
    let calculator = ReadinessCalculator::new();
    let mut group = c.benchmark_group("Readiness Assessment");

    for &days in &[7u32, 30, 90] {
        let series = create_daily_series(days);

        group.throughput(Throughput::Elements(days as u64));
        group.bench_with_input(BenchmarkId::new("assess_each_day", days), &series, |b, series| {
            b.iter(|| {
                for day in series {
                    black_box(calculator.assess_in_history(day, series, 7));
                }
            });
        });
    }

    group.finish();
}

fn bench_trend(c: &mut Criterion) {
    let analyzer = TrendAnalyzer::default();
    let mut group = c.benchmark_group("Trend Analysis");

    for &days in &[7u32, 28, 90, 365] {
        let series = create_daily_series(days);
        let range = DateRange::new(series[0].date, series[series.len() - 1].date).unwrap();

        group.throughput(Throughput::Elements(days as u64));
        group.bench_with_input(BenchmarkId::new("analyze", days), &series, |b, series| {
            b.iter(|| black_box(analyzer.analyze(range, series)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_assess, bench_trend);
criterion_main!(benches);

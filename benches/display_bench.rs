//! Benchmarks for display-state derivation and chart export
//!
//! Run with: cargo bench

use chrono::{DateTime, Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ecg_monitor::{
    render_svg, ChartFrame, ChartLayout, DisplaySettings, DisplayState, Locale, Sample,
};

/// Samples with timestamps in reverse order, the worst case for the sort
fn create_test_samples(count: usize) -> Vec<Sample> {
    let start: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
    (0..count)
        .rev()
        .map(|i| Sample::new(start + Duration::milliseconds(i as i64 * 4), (i as f64 * 0.05).sin()))
        .collect()
}

fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive");
    let settings = DisplaySettings::default();

    for size in [100, 1000, 10000] {
        let samples = create_test_samples(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("from_fetch_{}", size), |b| {
            b.iter(|| {
                DisplayState::from_fetch::<()>(Ok(black_box(samples.clone())), &settings)
            })
        });
    }

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let layout = ChartLayout::default();

    for size in [100, 1000] {
        let frame =
            ChartFrame::from_samples(create_test_samples(size), &DisplaySettings::default())
                .unwrap();

        group.bench_function(format!("svg_{}", size), |b| {
            b.iter(|| render_svg(black_box(&frame), &layout, 1.3, Locale::En))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_derive, bench_export);
criterion_main!(benches);

//! Benchmarks for the swing pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swing_core::Bar;
use swing_structure::{PivotConfig, SwingAnalyzer};

fn generate_bars(size: usize) -> Vec<Bar> {
    (0..size)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.013).cos() * 3.0;
            Bar::new(i as i64 * 60_000, close, close + 0.4, close - 0.4, close, 1_000.0)
        })
        .collect()
}

fn benchmark_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("SwingAnalyzer");

    for size in [375, 3750, 37500].iter() {
        let bars = generate_bars(*size);
        for (left, right) in [(3, 3), (2, 4)] {
            let analyzer = SwingAnalyzer::new(PivotConfig::new(left, right).unwrap()).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{}x{}", left, right), size),
                &bars,
                |b, bars| b.iter(|| analyzer.analyze(black_box(bars))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_analyze);
criterion_main!(benches);

//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swing_core::traits::Indicator;
use swing_core::Bar;
use swing_indicators::{Atr, Rsi, Smoothing};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn benchmark_rsi(c: &mut Criterion) {
    let mut group = c.benchmark_group("RSI");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);

        for smoothing in [Smoothing::Rma, Smoothing::Sma] {
            let rsi = Rsi::with_smoothing(14, smoothing).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", smoothing), size),
                &data,
                |b, data| b.iter(|| rsi.calculate(black_box(data))),
            );
        }
    }

    group.finish();
}

fn benchmark_atr(c: &mut Criterion) {
    let mut group = c.benchmark_group("ATR");

    for size in [1000, 10000].iter() {
        let bars: Vec<Bar> = generate_test_data(*size)
            .into_iter()
            .enumerate()
            .map(|(i, p)| Bar::new(i as i64, p, p + 1.0, p - 1.0, p, 0.0))
            .collect();
        let atr = Atr::new(14, Smoothing::Rma).unwrap();

        group.bench_with_input(BenchmarkId::new("rma", size), &bars, |b, bars| {
            b.iter(|| atr.calculate_bars(black_box(bars)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_rsi, benchmark_atr);
criterion_main!(benches);

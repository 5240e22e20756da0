//! L-moment estimator benchmark: centrality-sized series.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graph_features::features::lmoments;

fn series(n: usize) -> Vec<f64> {
    (0..n).map(|i| ((i * 7919) % 1013) as f64 / 1013.0).collect()
}

fn bench_lmoments_by_len(c: &mut Criterion) {
    let mut g = c.benchmark_group("lmoments_by_len");
    for n in [16, 256, 4096, 65536] {
        let values = series(n);
        g.bench_function(format!("n_{}", n).as_str(), |b| {
            b.iter(|| lmoments(black_box(&values)))
        });
    }
    g.finish();
}

fn bench_lmoments_with_nan(c: &mut Criterion) {
    let mut values = series(4096);
    for v in values.iter_mut().step_by(5) {
        *v = f64::NAN;
    }
    c.bench_function("lmoments_4096_with_nan", |b| {
        b.iter(|| lmoments(black_box(&values)))
    });
}

criterion_group!(benches, bench_lmoments_by_len, bench_lmoments_with_nan);
criterion_main!(benches);

//! Prediction benchmarks
//!
//! ```bash
//! cargo bench -p maintenance --bench prediction
//! ```

use chrono::{Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use maintenance::{current_mileage, predict_vehicle_mileage};
use storage::Mileage;

fn history(len: usize) -> Vec<Mileage> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
    let now = Utc::now();
    (0..len)
        .map(|i| Mileage {
            id: i as i64,
            vehicle_id: 1,
            mileage: i as i64 * 37,
            date: start + Duration::days(i as i64),
            created_at: now,
            updated_at: now,
        })
        // newest first, the order the repository returns
        .rev()
        .collect()
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prediction");
    for len in [2usize, 30, 365, 3650] {
        let readings = history(len);
        group.bench_with_input(BenchmarkId::new("predict", len), &readings, |b, r| {
            b.iter(|| predict_vehicle_mileage(black_box(r), black_box(7)))
        });
        group.bench_with_input(BenchmarkId::new("current", len), &readings, |b, r| {
            b.iter(|| current_mileage(black_box(r)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_prediction);
criterion_main!(benches);

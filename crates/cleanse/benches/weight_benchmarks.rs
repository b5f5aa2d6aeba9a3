//! Weight converter benchmarks.
//!
//! Measures per-cell conversion cost across the unit forms found in product
//! exports.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cleanse::normalize::{convert_weight, parse_weight};
use cleanse::Value;

/// Generate weight strings in a realistic mix of units.
fn generate_weights(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| match rng.gen_range(0..6) {
            0 => format!("{}g", rng.gen_range(1..2000)),
            1 => format!("{:.2}kg", rng.gen_range(0.1..25.0)),
            2 => format!("{}ml", rng.gen_range(50..2000)),
            3 => format!("{}oz", rng.gen_range(1..64)),
            4 => format!("{} x {}g", rng.gen_range(2..24), rng.gen_range(10..500)),
            _ => format!("{}g .", rng.gen_range(1..900)),
        })
        .collect()
}

/// Benchmark parsing single forms.
fn bench_parse_forms(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_weight");

    for sample in ["77g .", "1.6kg", "400ml", "16oz", "12 x 100g", "9GO5H4"] {
        group.bench_with_input(BenchmarkId::new("form", sample), sample, |b, s| {
            b.iter(|| black_box(parse_weight(black_box(s))))
        });
    }

    group.finish();
}

/// Benchmark converting whole columns of mixed units.
fn bench_convert_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_weight_column");

    for rows in [100, 1_000, 10_000].iter() {
        let column: Vec<Value> = generate_weights(*rows).into_iter().map(Value::Text).collect();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &column, |b, column| {
            b.iter(|| {
                column
                    .iter()
                    .map(convert_weight)
                    .filter(|v| !v.is_null())
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_forms, bench_convert_column);
criterion_main!(benches);

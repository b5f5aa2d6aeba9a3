//! Entity pipeline benchmarks.
//!
//! Runs the products and users pipelines end to end over synthetic tables.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cleanse::{CleansingEngine, EntityKind, Table, Value};

/// Generate a raw products table with duplicates, removals and bad cells.
fn generate_products(rows: usize) -> Table {
    let mut rng = StdRng::seed_from_u64(7);
    let columns = EntityKind::Products
        .expected_columns()
        .iter()
        .map(|c| c.to_string())
        .collect();

    let data = (0..rows)
        .map(|i| {
            let weight = match rng.gen_range(0..4) {
                0 => format!("{}g", rng.gen_range(1..2000)),
                1 => format!("{}kg", rng.gen_range(1..20)),
                2 => format!("{} x {}g", rng.gen_range(2..12), rng.gen_range(10..300)),
                _ => "9GO5H4".to_string(),
            };
            let removed = if rng.gen_bool(0.05) { "Removed" } else { "Still_available" };
            vec![
                Value::text(i.to_string()),
                Value::text(format!("Product {}", rng.gen_range(0..rows / 2 + 1))),
                Value::text(format!("£{}.{:02}", rng.gen_range(0..100), rng.gen_range(0..100))),
                Value::text(weight),
                Value::text("homeware"),
                Value::text(rng.gen_range(1_000_000_000_000u64..9_999_999_999_999).to_string()),
                Value::text(format!(
                    "20{:02}-{:02}-{:02}",
                    rng.gen_range(0..23),
                    rng.gen_range(1..=12),
                    rng.gen_range(1..=28)
                )),
                Value::text(format!("uuid-{i}")),
                Value::text(removed),
                Value::text(format!("R7-{i}")),
            ]
        })
        .collect();

    Table::new(columns, data)
}

/// Generate a raw users table across the three phone grammars.
fn generate_users(rows: usize) -> Table {
    let mut rng = StdRng::seed_from_u64(11);
    let columns = EntityKind::Users
        .expected_columns()
        .iter()
        .map(|c| c.to_string())
        .collect();

    let data = (0..rows)
        .map(|i| {
            let (code, phone) = match rng.gen_range(0..3) {
                0 => ("GB", format!("+44 (0)1{} {} {}", rng.gen_range(100..999), rng.gen_range(100..999), rng.gen_range(100..999))),
                1 => ("US", format!("({}) {}-{}", rng.gen_range(200..999), rng.gen_range(100..999), rng.gen_range(1000..9999))),
                _ => ("DE", format!("+49 {} {}", rng.gen_range(20..99), rng.gen_range(100_000..9_999_999))),
            };
            vec![
                Value::text(i.to_string()),
                Value::text("Ada"),
                Value::text("Lovelace"),
                Value::text("1968-10-16"),
                Value::text("Analytical Engines Ltd"),
                Value::text("ada@example.com"),
                Value::text("1 Babbage Row"),
                Value::text("Somewhere"),
                Value::text(code),
                Value::text(phone),
                Value::text("2016 October 12"),
                Value::text(format!("uuid-{i}")),
            ]
        })
        .collect();

    Table::new(columns, data)
}

fn bench_entity(c: &mut Criterion, kind: EntityKind, generate: fn(usize) -> Table) {
    let mut group = c.benchmark_group(format!("clean_{}", kind));
    let engine = CleansingEngine::new();

    for rows in [100, 1_000, 10_000].iter() {
        let raw = generate(*rows);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &raw, |b, raw| {
            b.iter_with_setup(
                || raw.clone(),
                |raw| black_box(engine.clean(kind, raw).unwrap()),
            )
        });
    }

    group.finish();
}

fn bench_products(c: &mut Criterion) {
    bench_entity(c, EntityKind::Products, generate_products);
}

fn bench_users(c: &mut Criterion) {
    bench_entity(c, EntityKind::Users, generate_users);
}

criterion_group!(benches, bench_products, bench_users);
criterion_main!(benches);

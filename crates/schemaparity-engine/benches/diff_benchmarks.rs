//! Benchmarks for normalization and diffing of wide schemas
//!
//! Flattened warehouse tables can carry thousands of columns; these measure
//! how normalize + diff scale with field count.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use schemaparity_core::{normalize, RawField, RawSchema};
use schemaparity_engine::SchemaDiff;

/// Generate a raw schema with `num_fields` fields in reverse name order
///
/// Every `drift`-th field gets a different type and every `drift`-th field
/// (offset by one) is renamed, so old and new disagree in all three ways.
fn generate_schema(num_fields: usize, drift: Option<usize>) -> RawSchema {
    (0..num_fields)
        .rev()
        .map(|i| {
            let mut name = format!("d_{:06}", i);
            let mut field_type = if i % 3 == 0 { "STRING" } else { "INTEGER" }.to_string();
            if let Some(every) = drift {
                if i % every == 0 {
                    field_type = "FLOAT".to_string();
                }
                if i % every == 1 {
                    name.push_str("_v2");
                }
            }
            RawField::new(name, field_type).with_mode("NULLABLE")
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [100, 1_000, 10_000] {
        let raw = generate_schema(size, None);
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| normalize(black_box(raw)).unwrap())
        });
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for size in [100, 1_000, 10_000] {
        let old = normalize(&generate_schema(size, None)).unwrap();
        let new = normalize(&generate_schema(size, Some(10))).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &(old, new), |b, (old, new)| {
            b.iter(|| SchemaDiff::compute(black_box(old), black_box(new)))
        });
    }

    group.finish();
}

fn bench_identical(c: &mut Criterion) {
    let schema = normalize(&generate_schema(5_000, None)).unwrap();

    c.bench_function("diff_identical_5000", |b| {
        b.iter(|| {
            let diff = SchemaDiff::compute(black_box(&schema), black_box(&schema));
            assert!(diff.is_empty());
        })
    });
}

criterion_group!(benches, bench_normalize, bench_diff, bench_identical);
criterion_main!(benches);

//! Performance benchmarks for the rulequery engine
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.
//!
//! Measures free-text parsing and suggestion lookup for queries of growing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rulequery_engine::{complete, parse_query, Schema};

/// Build `count` bracketed rules joined by AND
fn generate_query(count: usize) -> String {
    let rules: Vec<String> = (0..count)
        .map(|i| {
            if i % 2 == 0 {
                format!(r#"(text contains "term_{i}" OR classifier in "c{i}")"#)
            } else {
                format!(r#"(created_date > "2024-01-{:02}")"#, i % 28 + 1)
            }
        })
        .collect();
    rules.join(" AND ")
}

fn bench_parse_query(c: &mut Criterion) {
    let schema = Schema::default_schema();
    let mut group = c.benchmark_group("parse_query");

    for count in [1, 10, 50] {
        let query = generate_query(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &query, |b, query| {
            b.iter(|| parse_query(black_box(&schema), black_box(query)).unwrap());
        });
    }

    group.finish();
}

fn bench_complete(c: &mut Criterion) {
    let schema = Schema::default_schema();
    let mut group = c.benchmark_group("complete");

    for count in [1, 10, 50] {
        let query = format!("{} AND created_date ", generate_query(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &query, |b, query| {
            b.iter(|| complete(black_box(&schema), black_box(query)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_query, bench_complete);
criterion_main!(benches);

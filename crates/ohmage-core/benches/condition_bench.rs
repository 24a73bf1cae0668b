//! Parsing and evaluation throughput for survey conditions.

#![allow(clippy::unwrap_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use ohmage_core::{Fragment, ItemId, Responses, Value};
use std::hint::black_box;

const SENTENCE: &str =
    "mood >= 3 and sleep < 8 or smoker = true and cigarettes > 10 or note != 'none'";

fn responses() -> Responses {
    [
        ("mood", Value::Number(4.0)),
        ("sleep", Value::Number(6.5)),
        ("smoker", Value::Boolean(true)),
        ("cigarettes", Value::Number(12.0)),
        ("note", Value::Text("none".into())),
    ]
    .into_iter()
    .map(|(id, value)| (ItemId::new(id), value))
    .collect()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_condition", |b| {
        b.iter(|| Fragment::parse(black_box(SENTENCE)).unwrap())
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let fragment = Fragment::parse(SENTENCE).unwrap();
    let responses = responses();
    c.bench_function("evaluate_condition", |b| {
        b.iter(|| fragment.evaluate(black_box(&responses)))
    });
}

criterion_group!(benches, bench_parse, bench_evaluate);
criterion_main!(benches);

#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};

use tjson::prelude::*;

const N_BIG_ARR: usize = 2000;

fn big_arr() -> Value {
    let v: Vec<Value> = (0..N_BIG_ARR).map(|i| Value::from(i as i64)).collect();
    Value::from(v)
}

const N_ARR: usize = 10;
const N_MAP: usize = 10;

fn big_obj() -> Value {
    let v0: Vec<Value> = (0..N_ARR).map(|i| Value::Float(i as f64 / 3.0)).collect();
    let m: Fields = (0..N_MAP)
        .map(|i| (format!("field-{}", i), Value::from(v0.clone())))
        .chain(std::iter::once((
            "blob".to_string(),
            Value::Binary(Bytes::from(vec![0xa5u8; 256])),
        )))
        .collect();
    let v: Vec<Value> = std::iter::repeat(m).map(Value::Object).take(N_ARR).collect();
    Value::from(v)
}

fn bench_dump(c: &mut Criterion) {
    let arr = big_arr();
    c.bench_function(&format!("dump an array of {} integers", N_BIG_ARR), |b| {
        b.iter(|| dump(black_box(&arr)))
    });

    let obj = big_obj();
    let pretty = DumpConfig {
        key_order: KeyOrder::Sorted,
        indent: Indent::Pretty(2),
        ..DumpConfig::default()
    };
    c.bench_function("dump nested objects", |b| b.iter(|| dump(black_box(&obj))));
    c.bench_function("dump nested objects, sorted and pretty", |b| {
        b.iter(|| dump_with(black_box(&obj), &pretty))
    });
}

fn bench_parse(c: &mut Criterion) {
    let arr = dump(&big_arr()).unwrap();
    c.bench_function(&format!("parse {} bytes of integers", arr.len()), |b| {
        b.iter(|| parse(black_box(&arr)))
    });

    let obj = dump(&big_obj()).unwrap();
    c.bench_function(&format!("parse {} bytes of nested objects", obj.len()), |b| {
        b.iter(|| parse(black_box(&obj)))
    });
}

fn bench_json(c: &mut Criterion) {
    let obj = dump(&big_obj()).unwrap();
    c.bench_function("serde_json on the same nested objects", |b| {
        b.iter(|| serde_json::from_str::<serde_json::Value>(black_box(&obj)))
    });
}

criterion_group!(benches, bench_dump, bench_parse, bench_json);
criterion_main!(benches);

use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use num_bigint::BigInt;
use num_traits::Num;
use proptest::prelude::*;
use tjson::{Fields, Value};

/// arbitrary Integer for use with proptest
pub fn arb_bigint() -> impl Strategy<Value = BigInt> {
    "-?1[0-1]{63,}".prop_map(|n| -> BigInt { BigInt::from_str_radix(&n, 2).unwrap() })
}

/// arbitrary Bytes for use with proptest
pub fn arb_bytes() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..64).prop_map(Bytes::from)
}

/// arbitrary timestamp between 1970 and 9999, in any whole-minute offset
pub fn arb_timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (
        86_400i64..253_402_214_399,
        0u32..1_000_000_000,
        -1439i32..=1439,
    )
        .prop_filter_map("timestamp out of range", |(secs, nanos, minutes)| {
            let offset = FixedOffset::east_opt(minutes * 60)?;
            DateTime::from_timestamp(secs, nanos).map(|t| t.with_timezone(&offset))
        })
}

/// arbitrary finite double
pub fn arb_float() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("non-finite", |f| f.is_finite())
}

/// arbitrary scalar for use with proptest
pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<String>().prop_map(Value::from),
        // integers
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<i128>().prop_map(Value::from),
        arb_bigint().prop_map(Value::from),
        // floats
        arb_float().prop_map(Value::Float),
        // bytestrings
        arb_bytes().prop_map(Value::Binary),
        arb_timestamp().prop_map(Value::Timestamp),
    ]
}

/// arbitrary array element: anything but a set, which can only be an object member
pub fn arb_element() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(
        6,  // max depth
        64, // max nodes
        8,  // max items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                members(inner).prop_map(Value::Object),
            ]
        },
    )
}

/// arbitrary object members built from `inner`, sets included
fn members(inner: impl Strategy<Value = Value> + Clone) -> impl Strategy<Value = Fields> {
    let member = prop_oneof![
        3 => inner.clone(),
        1 => prop::collection::vec(inner, 0..8).prop_map(|ms| Value::Set(dedup(ms))),
    ];
    prop::collection::vec((any::<String>(), member), 0..8)
        .prop_map(|kvs| kvs.into_iter().collect::<Fields>())
}

fn dedup(members: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(members.len());
    for m in members {
        if !out.contains(&m) {
            out.push(m);
        }
    }
    out
}

/// arbitrary object for use with proptest
pub fn arb_fields() -> impl Strategy<Value = Fields> { members(arb_element().boxed()) }

/// arbitrary TJSON document for use with proptest
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_fields().prop_map(Value::Object),
        prop::collection::vec(arb_element(), 0..8).prop_map(Value::Array),
    ]
}

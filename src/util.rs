#[macro_export]
/// Helper macro to compose `From` implementations.
macro_rules! compose_from {
    ($to:tt, $mid:tt, $from:ty) => {
        impl From<$from> for $to {
            fn from(f: $from) -> Self { Self::from($mid::from(f)) }
        }
    };
}

#[macro_export]
/// Helper macro to make implementing `From` easier.
macro_rules! from_fn {
    ($to:ty, $from:ty, $fn:expr) => {
        impl From<$from> for $to {
            fn from(f: $from) -> $to { $fn(f) }
        }
    };
}

/// Implements `From` for every primitive integer through [`BigInt`](num_bigint::BigInt).
macro_rules! from_ints {
    ($to:tt) => {
        compose_from!($to, BigInt, i8);
        compose_from!($to, BigInt, i16);
        compose_from!($to, BigInt, i32);
        compose_from!($to, BigInt, i64);
        compose_from!($to, BigInt, i128);
        compose_from!($to, BigInt, isize);

        compose_from!($to, BigInt, u8);
        compose_from!($to, BigInt, u16);
        compose_from!($to, BigInt, u32);
        compose_from!($to, BigInt, u64);
        compose_from!($to, BigInt, u128);
        compose_from!($to, BigInt, usize);
    };
}

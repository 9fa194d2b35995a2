pub use crate::{
    dump::{dump, dump_with, BinaryEncoding, DumpConfig, Indent, KeyOrder},
    errors::{
        ParseError, ParseErrorKind, Path, PathSegment, SerializationError,
        SerializationErrorKind, TagError, TagErrorKind,
    },
    fields::Fields,
    parse::{parse, parse_slice},
    tag::{resolve, Form, Tag},
    Value,
};
pub use bytes::Bytes;
pub use chrono::{DateTime, FixedOffset, Utc};
pub use num_bigint::BigInt;
pub use std::str::FromStr;

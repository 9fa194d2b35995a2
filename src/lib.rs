//! # TJSON
//!
//! TJSON (Tagged JSON) is JSON in which every object key and every string element
//! carries a type tag. The tags turn JSON's handful of types into a richer set:
//! text, unbounded integers, floats, timestamps, binary data in three encodings,
//! arrays, sets and objects. A TJSON document is always valid JSON.
//!
//! # Usage
//!
//! [`parse`] reads text into a [`Value`] tree, [`dump`] writes one back out.
//!
//! ```
//! use tjson::prelude::*;
//!
//! let text = r#"{"s:name": "s:hello", "i:big": "i:123456789012345678901234567890"}"#;
//!
//! let value = parse(text).unwrap();
//!
//! assert_eq!(value.get("name"), Some(&Value::from("hello")));
//!
//! // canonical text round-trips byte for byte
//! assert_eq!(dump(&value).unwrap(), text);
//! ```
//!
//! Trees can also be built by hand and handed to [`dump`]:
//!
//! ```
//! use tjson::prelude::*;
//!
//! let mut fields = Fields::new();
//! fields.insert("data", Value::from_static(b"foo"));
//! fields.insert("nums", Value::from(vec![1.5, 2.0]));
//!
//! let text = dump(&Value::Object(fields)).unwrap();
//!
//! assert_eq!(text, r#"{"b64:data": "b64:Zm9v", "arr:nums": [1.5, 2.0]}"#);
//! ```
//!
//! # An overview of TJSON types
//!
//! | Tag    | [`Value`] variant          | Written as |
//! | ---    | ---                        | --- |
//! | `s`    | [`Value::Utf8String`]      | string |
//! | `i`    | [`Value::Integer`]         | string of decimal digits, optional `-` |
//! | `u`    | [`Value::Integer`]         | string of decimal digits, read only |
//! | `f`    | [`Value::Float`]           | JSON number |
//! | `t`    | [`Value::Timestamp`]       | RFC 3339 string with offset |
//! | `b16`  | [`Value::Binary`]          | lowercase hex |
//! | `b32`  | [`Value::Binary`]          | lowercase base32, no padding |
//! | `b64`  | [`Value::Binary`]          | base64url, no padding |
//! | `bool` | [`Value::Bool`]            | `true` / `false` |
//! | `null` | [`Value::Null`]            | `null` |
//! | `arr`  | [`Value::Array`]           | JSON array |
//! | `obj`  | [`Value::Object`]          | JSON object |
//! | `set`  | [`Value::Set`]             | JSON array, distinct members |
//!
//! See also: [`tag`].
//!
//! # Format
//!
//! ## Roots
//!
//! A document is a single JSON object or array. Any other root is rejected with
//! [`ParseErrorKind::UntaggedScalar`].
//!
//! ## Keys
//!
//! Object keys are `tag:name`, split at the first `:`. The tag says how to read the
//! member's value and the rest is the field name, which may itself contain `:`.
//! Field names are unique within an object.
//!
//! ## Member values
//!
//! A value under a string-form tag (`s`, `i`, `u`, `t`, `b16`, `b32`, `b64`) is a JSON
//! string. It may repeat its key's tag, `{"i:n": "i:5"}`, and the serializer always
//! does; a string not starting with that exact tag is the payload in full,
//! `{"i:n": "5"}`. The other tags take the matching JSON value directly.
//!
//! ## Elements
//!
//! Elements of arrays and sets have no key, so they describe themselves. Strings must
//! start with a string-form tag, `["s:x", "i:1"]`. Numbers are floats, and literals,
//! arrays and objects are what they look like. Sets therefore only appear as object
//! members.

#![warn(
    unsafe_code,
    unused_labels,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    macro_use_extern_crate,
    unreachable_pub,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]
#![allow(clippy::cast_lossless)]

#[macro_use]
mod util;

pub mod base32;
pub mod dump;
pub mod errors;
pub mod fields;
pub mod parse;
pub mod prelude;
pub mod tag;

pub use crate::{
    dump::{dump, dump_with, BinaryEncoding, DumpConfig, Indent, KeyOrder},
    errors::{ParseError, ParseErrorKind, SerializationError, TagError},
    fields::Fields,
    parse::{parse, parse_slice},
    tag::{resolve, Tag},
};

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use failure::{bail, Error};
use num_bigint::BigInt;

#[derive(Clone, Debug)]
/// [`Value`] and its variants.
///
/// # Example
///
/// ```
/// use tjson::prelude::*;
///
/// let b = Value::Bool(true);
///
/// let val = match b {
///     Value::Bool(b) => b,
///     _ => panic!(),
/// };
///
/// assert!(val);
/// ```
pub enum Value {
    /// Null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer of any size.
    ///
    /// # Example
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let big = BigInt::from(u64::max_value()) * 1000;
    ///
    /// let k_num = Value::Integer(big);
    /// ```
    Integer(BigInt),
    /// Double precision floating point number. Must be finite to be written out.
    Float(f64),
    /// Text.
    Utf8String(String),
    /// Bytestring.
    ///
    /// # Example
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let bytes = Bytes::from_static(b"hello world");
    ///
    /// let k_bytes = Value::Binary(bytes);
    /// ```
    Binary(Bytes),
    /// Point in time, with the offset it was written in.
    Timestamp(DateTime<FixedOffset>),
    /// Unordered collection of distinct values.
    ///
    /// Stored in a [`Vec`] so that member order stays stable; equality ignores it.
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let a = Value::Set(vec![Value::from("x"), Value::from("y")]);
    /// let b = Value::Set(vec![Value::from("y"), Value::from("x")]);
    ///
    /// assert_eq!(a, b);
    /// ```
    Set(Vec<Value>),
    /// Array.
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let k_array = Value::Array(vec![1, 2, 3, 4].into_iter().map(Value::from).collect());
    /// ```
    Array(Vec<Value>),
    /// Object.
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let fields: Fields = vec![("hello", Value::from("world"))].into_iter().collect();
    ///
    /// let obj = Value::Object(fields);
    /// ```
    Object(Fields),
}

use Value::*;

impl Value {
    /// Converts a [`Value`] to a slice of [`Value`].
    /// This will return an [`Error`] if the value is not a [`Value::Array`].
    ///
    /// # Example
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let v = Value::from(vec!["a", "b"]);
    ///
    /// assert_eq!(v.to_vec().unwrap().len(), 2);
    /// ```
    pub fn to_vec(&self) -> Result<&Vec<Value>, Error> {
        match self {
            Array(a) => Ok(a),
            _ => bail!("This value is not an `Array`"),
        }
    }

    /// Consumes a [`Value`], converting it into a vector of [`Value`]s.
    /// This will return an [`Error`] if the value is not a [`Value::Array`].
    pub fn into_vec(self) -> Result<Vec<Value>, Error> {
        match self {
            Array(a) => Ok(a),
            _ => bail!("This value is not an `Array`"),
        }
    }

    /// Converts a [`Value`] to the members of a set.
    /// This will return an [`Error`] if the value is not a [`Value::Set`].
    pub fn to_set(&self) -> Result<&Vec<Value>, Error> {
        match self {
            Set(s) => Ok(s),
            _ => bail!("This value is not a `Set`"),
        }
    }

    /// Converts a [`Value`] to its [`Fields`].
    /// This will return an [`Error`] if the value is not a [`Value::Object`].
    pub fn to_fields(&self) -> Result<&Fields, Error> {
        match self {
            Object(fields) => Ok(fields),
            _ => bail!("This value is not an `Object`"),
        }
    }

    /// Consumes a [`Value`], converting it into its [`Fields`].
    /// This will return an [`Error`] if the value is not a [`Value::Object`].
    pub fn into_fields(self) -> Result<Fields, Error> {
        match self {
            Object(fields) => Ok(fields),
            _ => bail!("This value is not an `Object`"),
        }
    }

    /// Looks up a field of an object, `None` if the value is not an object or has no
    /// such field.
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let v = parse(r#"{"s:foo": "s:bar"}"#).unwrap();
    ///
    /// assert_eq!(v.get("foo"), Some(&Value::from("bar")));
    /// assert!(v.get("baz").is_none());
    /// ```
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Object(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Converts a bytestring literal to [`Value`].
    ///
    /// # Arguments
    ///
    /// * `bytes: &'static [u8]` - the bytestring literal to be converted.
    ///
    /// # Example
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let foo = Value::from_static(b"this is an example");
    /// ```
    pub fn from_static(bytes: &'static [u8]) -> Value { Binary(Bytes::from_static(bytes)) }

    /// Indicates whether a value is [`Null`].
    pub fn is_null(&self) -> bool {
        match self {
            Null => true,
            _ => false,
        }
    }

    /// Tries to convert a value to a [`bool`].
    /// This will return an [`Error`] if the value is not a [`Value::Bool`].
    pub fn to_bool(&self) -> Result<bool, Error> {
        match self {
            Bool(b) => Ok(*b),
            _ => bail!("Value is not `Bool`"),
        }
    }

    /// Tries to convert a value to a [`BigInt`].
    /// This will return an [`Error`] if the value is not a [`Value::Integer`].
    pub fn to_integer(&self) -> Result<&BigInt, Error> {
        match self {
            Integer(i) => Ok(i),
            _ => bail!("Value is not `Integer`"),
        }
    }

    /// Tries to convert a value to an [`f64`].
    /// This will return an [`Error`] if the value is not a [`Value::Float`].
    pub fn to_float(&self) -> Result<f64, Error> {
        match self {
            Float(f) => Ok(*f),
            _ => bail!("Value is not `Float`"),
        }
    }

    /// Tries to convert a value to a [`str`].
    /// This will return an [`Error`] if the value is not a [`Value::Utf8String`].
    pub fn to_str(&self) -> Result<&str, Error> {
        match self {
            Utf8String(s) => Ok(s),
            _ => bail!("Value is not `Utf8String`"),
        }
    }

    /// Tries to convert a value to [`Bytes`].
    /// This will return an [`Error`] if the value is not a [`Value::Binary`].
    ///
    /// ```
    /// use tjson::prelude::*;
    ///
    /// let foo = Value::from_static(b"This is an example");
    ///
    /// let foo_bytes = foo.to_bytes().unwrap();
    /// ```
    pub fn to_bytes(&self) -> Result<&Bytes, Error> {
        match self {
            Binary(b) => Ok(b),
            _ => bail!("Value is not `Binary`"),
        }
    }

    /// Tries to convert a value to a timestamp.
    /// This will return an [`Error`] if the value is not a [`Value::Timestamp`].
    pub fn to_timestamp(&self) -> Result<&DateTime<FixedOffset>, Error> {
        match self {
            Timestamp(t) => Ok(t),
            _ => bail!("Value is not `Timestamp`"),
        }
    }
}

/// Structural equality. Sets compare as unordered collections; everything else,
/// object member order included, compares in order.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Utf8String(a), Utf8String(b)) => a == b,
            (Binary(a), Binary(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Set(a), Set(b)) => {
                a.len() == b.len()
                    && a.iter().all(|m| b.contains(m))
                    && b.iter().all(|m| a.contains(m))
            }
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value { Utf8String(s.to_owned()) }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Value { Array(v.into_iter().map(T::into).collect()) }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Value { Timestamp(t.into()) }
}

// scalars
from_fn!(Value, bool, Bool);
from_fn!(Value, BigInt, Integer);
from_fn!(Value, f64, Float);
from_fn!(Value, f32, |f: f32| Float(f as f64));
from_fn!(Value, String, Utf8String);
from_fn!(Value, Bytes, Binary);
from_fn!(Value, DateTime<FixedOffset>, Timestamp);

// containers
from_fn!(Value, Fields, Object);

// integers
from_ints!(Value);

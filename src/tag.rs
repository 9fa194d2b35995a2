//! The TJSON tag grammar.
//!
//! Every tag is a row in one closed table: its spelling, the JSON [`Form`] its values
//! take, and the decode/encode pair for its payload. The parser asks this module
//! whether a payload is valid for a tag, and the serializer asks it which tag a value
//! needs and how its payload is spelled, so both directions read from the same rows.
//!
//! # Example
//!
//! ```
//! use tjson::prelude::*;
//!
//! let v = resolve("b16", "48656c6c6f").unwrap();
//! assert_eq!(v, Value::from_static(b"Hello"));
//!
//! let err = resolve("b16", "48656C6C6F").unwrap_err();
//! assert_eq!(err.kind(), TagErrorKind::EncodingMismatch);
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat};
use num_bigint::BigInt;
use std::{fmt, str::FromStr};

use crate::{base32, errors::TagError, Value};

/// Separates a tag from its payload or field name.
pub const DELIMITER: char = ':';

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// The tags of the grammar.
pub enum Tag {
    /// `s`, UTF-8 text.
    Utf8,
    /// `i`, a signed integer of any size.
    Signed,
    /// `u`, a non-negative integer of any size. Read only, written back as `i`.
    Unsigned,
    /// `f`, an IEEE-754 double.
    Float,
    /// `t`, an RFC 3339 timestamp.
    Timestamp,
    /// `b16`, lowercase hex.
    Base16,
    /// `b32`, lowercase unpadded base32.
    Base32,
    /// `b64`, unpadded base64url.
    Base64,
    /// `bool`
    Bool,
    /// `null`
    Null,
    /// `arr`, an ordered array.
    Array,
    /// `obj`, a nested object.
    Object,
    /// `set`, an array whose members are pairwise distinct.
    Set,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// The JSON shape a tag's value takes in the text.
pub enum Form {
    /// A JSON string holding the payload.
    Text,
    /// A JSON number.
    Number,
    /// `true` or `false`.
    Bool,
    /// `null`.
    Null,
    /// A JSON array of self-describing elements.
    Array,
    /// A JSON object of tagged keys.
    Object,
}

use Tag::*;

/// The grammar. Lookup in both directions goes through this table.
const TAGS: [(Tag, &str, Form); 13] = [
    (Utf8, "s", Form::Text),
    (Signed, "i", Form::Text),
    (Unsigned, "u", Form::Text),
    (Float, "f", Form::Number),
    (Timestamp, "t", Form::Text),
    (Base16, "b16", Form::Text),
    (Base32, "b32", Form::Text),
    (Base64, "b64", Form::Text),
    (Bool, "bool", Form::Bool),
    (Null, "null", Form::Null),
    (Array, "arr", Form::Array),
    (Object, "obj", Form::Object),
    (Set, "set", Form::Array),
];

impl Tag {
    fn row(self) -> &'static (Tag, &'static str, Form) {
        // every variant has exactly one row
        &TAGS[self as usize]
    }

    /// The spelling of the tag, without the delimiter.
    pub fn as_str(self) -> &'static str { self.row().1 }

    /// The JSON shape of values carrying this tag.
    pub fn form(self) -> Form { self.row().2 }

    /// The tag the serializer uses for `value`, with binary data written in
    /// `binary` encoding.
    pub fn of(value: &Value, binary: Tag) -> Tag {
        match value {
            Value::Null => Null,
            Value::Bool(_) => Bool,
            Value::Integer(_) => Signed,
            Value::Float(_) => Float,
            Value::Utf8String(_) => Utf8,
            Value::Binary(_) => binary,
            Value::Timestamp(_) => Timestamp,
            Value::Set(_) => Set,
            Value::Array(_) => Array,
            Value::Object(_) => Object,
        }
    }

    /// Decodes a scalar payload. `Bool` and `Null` accept the JSON literals; the
    /// container tags carry no payload and always fail.
    pub fn decode(self, payload: &str) -> Result<Value, TagError> {
        match self {
            Utf8 => Ok(Value::Utf8String(payload.to_owned())),
            Signed => decode_signed(payload),
            Unsigned => decode_unsigned(payload),
            Float => decode_float(payload),
            Timestamp => {
                DateTime::parse_from_rfc3339(payload)
                    .map(Value::Timestamp)
                    .map_err(|_| {
                        TagError::malformed(self, "not an RFC 3339 timestamp with offset")
                    })
            }
            Base16 => decode_b16(payload),
            Base32 => decode_b32(payload),
            Base64 => decode_b64(payload),
            Bool => {
                match payload {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(TagError::malformed(self, "expected `true` or `false`")),
                }
            }
            Null => {
                match payload {
                    "null" => Ok(Value::Null),
                    _ => Err(TagError::malformed(self, "expected `null`")),
                }
            }
            Array | Object | Set => {
                Err(TagError::mismatch(self, "container tags carry no scalar payload"))
            }
        }
    }

    /// Encodes the payload of a scalar `value` for this tag. Returns `None` when the
    /// tag does not describe the value or the value has no TJSON spelling.
    pub fn encode(self, value: &Value) -> Option<String> {
        match (self, value) {
            (Utf8, Value::Utf8String(s)) => Some(s.clone()),
            (Signed, Value::Integer(i)) => Some(i.to_string()),
            (Unsigned, Value::Integer(i)) if i.sign() != num_bigint::Sign::Minus => {
                Some(i.to_string())
            }
            (Float, Value::Float(f)) if f.is_finite() => Some(format!("{:?}", f)),
            (Timestamp, Value::Timestamp(t)) => {
                Some(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            (Base16, Value::Binary(b)) => Some(hex::encode(b)),
            (Base32, Value::Binary(b)) => Some(base32::encode(b)),
            (Base64, Value::Binary(b)) => Some(URL_SAFE_NO_PAD.encode(b)),
            (Bool, Value::Bool(b)) => Some(b.to_string()),
            (Null, Value::Null) => Some("null".to_owned()),
            _ => None,
        }
    }
}

impl FromStr for Tag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Tag, TagError> {
        TAGS.iter()
            .find(|(_, name, _)| *name == s)
            .map(|(tag, _, _)| *tag)
            .ok_or_else(TagError::unknown)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Resolves a raw `(tag, payload)` pair into a [`Value`].
pub fn resolve(tag: &str, payload: &str) -> Result<Value, TagError> {
    tag.parse::<Tag>()?.decode(payload)
}

/// Splits `s` at the first delimiter into `(tag, rest)`.
pub(crate) fn split(s: &str) -> Option<(&str, &str)> {
    let ndx = s.find(DELIMITER)?;
    Some((&s[..ndx], &s[ndx + 1..]))
}

/// Length of the longest prefix of `bytes` that is a JSON number, 0 if none.
pub(crate) fn scan_number(bytes: &[u8]) -> usize {
    let digit = |i: usize| bytes.get(i).map_or(false, |b| b.is_ascii_digit());
    let mut i = 0;

    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }

    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            i += 1;
            while digit(i) {
                i += 1;
            }
        }
        _ => return 0,
    }

    if bytes.get(i) == Some(&b'.') && digit(i + 1) {
        i += 2;
        while digit(i) {
            i += 1;
        }
    }

    if let Some(b'e') | Some(b'E') = bytes.get(i) {
        let mut j = i + 1;
        if let Some(b'+') | Some(b'-') = bytes.get(j) {
            j += 1;
        }
        if digit(j) {
            while digit(j) {
                j += 1;
            }
            i = j;
        }
    }

    i
}

fn is_decimal(digits: &str) -> bool {
    match digits.as_bytes() {
        [b'0'] => true,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

fn parse_decimal(tag: Tag, digits: &str) -> Result<BigInt, TagError> {
    BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| TagError::malformed(tag, "invalid decimal integer"))
}

fn decode_signed(payload: &str) -> Result<Value, TagError> {
    let digits = payload.strip_prefix('-').unwrap_or(payload);
    if !is_decimal(digits) {
        return Err(TagError::malformed(Signed, "invalid decimal integer"));
    }
    if payload == "-0" {
        return Err(TagError::malformed(Signed, "negative zero"));
    }
    parse_decimal(Signed, payload).map(Value::Integer)
}

fn decode_unsigned(payload: &str) -> Result<Value, TagError> {
    if let Some(digits) = payload.strip_prefix('-') {
        if is_decimal(digits) {
            return Err(TagError::mismatch(
                Unsigned,
                "negative value for unsigned integer",
            ));
        }
    }
    if !is_decimal(payload) {
        return Err(TagError::malformed(Unsigned, "invalid decimal integer"));
    }
    parse_decimal(Unsigned, payload).map(Value::Integer)
}

fn decode_float(payload: &str) -> Result<Value, TagError> {
    if payload.is_empty() || scan_number(payload.as_bytes()) != payload.len() {
        return Err(TagError::malformed(Float, "not a JSON number"));
    }
    match payload.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::Float(f)),
        _ => Err(TagError::malformed(Float, "number out of range for a double")),
    }
}

fn decode_b16(payload: &str) -> Result<Value, TagError> {
    if payload.bytes().any(|c| (b'A'..=b'F').contains(&c)) {
        return Err(TagError::mismatch(Base16, "Base16 data must be lowercase"));
    }
    hex::decode(payload)
        .map(|v| Value::Binary(Bytes::from(v)))
        .map_err(|_| TagError::malformed(Base16, "Invalid hexadecimal data"))
}

fn decode_b32(payload: &str) -> Result<Value, TagError> {
    if payload.bytes().any(|c| c.is_ascii_uppercase()) {
        return Err(TagError::mismatch(Base32, "Base32 data must be lowercase"));
    }
    if payload.contains('=') {
        return Err(TagError::mismatch(
            Base32,
            "Base32 data must not include padding",
        ));
    }
    base32::decode(payload)
        .map(|v| Value::Binary(Bytes::from(v)))
        .ok_or_else(|| TagError::malformed(Base32, "Invalid base32-encoded data"))
}

fn decode_b64(payload: &str) -> Result<Value, TagError> {
    if payload.contains(|c: char| c == '+' || c == '/') {
        return Err(TagError::mismatch(
            Base64,
            "Base64 data must not contain '+' or '/'",
        ));
    }
    if payload.contains('=') {
        return Err(TagError::mismatch(
            Base64,
            "Base64 data must not include padding",
        ));
    }
    URL_SAFE_NO_PAD
        .decode(payload)
        .map(|v| Value::Binary(Bytes::from(v)))
        .map_err(|_| TagError::malformed(Base64, "Invalid base64-encoded data"))
}

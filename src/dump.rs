//! # TJSON serializer
//!
//! Writes a [`Value`] tree as TJSON text. Every key is written `tag:name` and every
//! string-form payload repeats its tag, so the output parses back to an equal tree
//! whichever way it was read in.
//!
//! The tree is checked while it is written. A tree that [`parse`](crate::parse) could
//! never have produced fails with
//! [`InvariantViolation`](crate::errors::SerializationErrorKind::InvariantViolation)
//! and no text is returned.
//!
//! # Example
//!
//! ```
//! use tjson::prelude::*;
//!
//! let v = parse(r#"{"s:b": "s:2", "s:a": "s:1"}"#).unwrap();
//!
//! let config = DumpConfig {
//!     key_order: KeyOrder::Sorted,
//!     indent: Indent::Pretty(2),
//!     ..DumpConfig::default()
//! };
//!
//! assert_eq!(
//!     dump_with(&v, &config).unwrap(),
//!     "{\n  \"s:a\": \"s:1\",\n  \"s:b\": \"s:2\"\n}"
//! );
//! ```

use chrono::Datelike;
use tracing::debug;

use crate::{
    errors::{Path, PathSegment, SerializationError},
    fields::Fields,
    parse::MAX_DEPTH,
    tag::{Form, Tag},
    Value,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// The order object members are written in.
pub enum KeyOrder {
    /// The order of the [`Fields`].
    Preserve,
    /// Sorted by field name.
    Sorted,
}

impl Default for KeyOrder {
    fn default() -> Self { KeyOrder::Preserve }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Whitespace layout of the output.
pub enum Indent {
    /// Everything on one line.
    None,
    /// One member or element per line, indented by this many spaces per level.
    Pretty(usize),
}

impl Default for Indent {
    fn default() -> Self { Indent::None }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// The tag binary data is written with.
pub enum BinaryEncoding {
    /// `b16`
    Base16,
    /// `b32`
    Base32,
    /// `b64`
    Base64,
}

impl BinaryEncoding {
    /// The tag this encoding writes.
    pub fn tag(self) -> Tag {
        match self {
            BinaryEncoding::Base16 => Tag::Base16,
            BinaryEncoding::Base32 => Tag::Base32,
            BinaryEncoding::Base64 => Tag::Base64,
        }
    }
}

impl Default for BinaryEncoding {
    fn default() -> Self { BinaryEncoding::Base64 }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
/// Options for [`dump_with`].
///
/// The default writes members in their stored order, on one line, with binary data
/// as `b64`.
pub struct DumpConfig {
    /// Member order.
    pub key_order: KeyOrder,
    /// Layout.
    pub indent: Indent,
    /// Binary encoding.
    pub binary: BinaryEncoding,
}

/// Serializes `value` with the default [`DumpConfig`].
pub fn dump(value: &Value) -> Result<String, SerializationError> {
    dump_with(value, &DumpConfig::default())
}

/// Serializes `value` as configured by `config`.
///
/// ```
/// use tjson::prelude::*;
///
/// let v = Value::Array(vec![Value::from_static(b"Hello")]);
/// let config = DumpConfig {
///     binary: BinaryEncoding::Base16,
///     ..DumpConfig::default()
/// };
///
/// assert_eq!(dump_with(&v, &config).unwrap(), r#"["b16:48656c6c6f"]"#);
/// ```
pub fn dump_with(value: &Value, config: &DumpConfig) -> Result<String, SerializationError> {
    debug!(config = ?config, "dumping tjson value");

    let mut w = Writer {
        config,
        out: String::new(),
        path: Path::root(),
        depth: 0,
    };

    match value {
        Value::Object(fields) => w.write_object(fields)?,
        Value::Array(elems) => w.write_elements(elems)?,
        _ => {
            return Err(SerializationError::invariant(
                Path::root(),
                "root must be an object or an array",
            ))
        }
    }

    Ok(w.out)
}

struct Writer<'c> {
    config: &'c DumpConfig,
    out: String,
    path: Path,
    depth: usize,
}

impl<'c> Writer<'c> {
    fn violation(&self, reason: &'static str) -> SerializationError {
        SerializationError::invariant(self.path.clone(), reason)
    }

    /// Fails on containers nested deeper than `parse` accepts.
    fn check_depth(&self) -> Result<(), SerializationError> {
        if self.depth >= MAX_DEPTH {
            Err(self.violation("nesting too deep"))
        } else {
            Ok(())
        }
    }

    /// Writes the separator before the `i`th member of a container.
    fn separator(&mut self, i: usize) {
        if i > 0 {
            self.out.push(',');
        }
        match self.config.indent {
            Indent::None => {
                if i > 0 {
                    self.out.push(' ');
                }
            }
            Indent::Pretty(_) => self.newline(),
        }
    }

    fn newline(&mut self) {
        if let Indent::Pretty(width) = self.config.indent {
            self.out.push('\n');
            for _ in 0..width * self.depth {
                self.out.push(' ');
            }
        }
    }

    fn write_object(&mut self, fields: &Fields) -> Result<(), SerializationError> {
        self.check_depth()?;
        if fields.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }

        let members: Vec<&(String, Value)> = match self.config.key_order {
            KeyOrder::Preserve => fields.iter().collect(),
            KeyOrder::Sorted => fields.sorted(),
        };

        self.out.push('{');
        self.depth += 1;

        for (i, (name, value)) in members.into_iter().enumerate() {
            self.separator(i);
            self.path.push(PathSegment::Field(name.clone()));

            let tag = Tag::of(value, self.config.binary.tag());
            write_string(&mut self.out, tag.as_str(), name);
            self.out.push_str(": ");
            self.write_member(tag, value)?;

            self.path.pop();
        }

        self.depth -= 1;
        self.newline();
        self.out.push('}');
        Ok(())
    }

    fn write_member(&mut self, tag: Tag, value: &Value) -> Result<(), SerializationError> {
        match value {
            Value::Object(fields) => self.write_object(fields),
            Value::Array(elems) => self.write_elements(elems),
            Value::Set(members) => {
                for i in 1..members.len() {
                    if members[..i].contains(&members[i]) {
                        self.path.push(PathSegment::Index(i));
                        return Err(self.violation("duplicate set member"));
                    }
                }
                self.write_elements(members)
            }
            _ => self.write_scalar(tag, value),
        }
    }

    fn write_elements(&mut self, elems: &[Value]) -> Result<(), SerializationError> {
        self.check_depth()?;
        if elems.is_empty() {
            self.out.push_str("[]");
            return Ok(());
        }

        self.out.push('[');
        self.depth += 1;

        for (i, elem) in elems.iter().enumerate() {
            self.separator(i);
            self.path.push(PathSegment::Index(i));

            match elem {
                Value::Object(fields) => self.write_object(fields)?,
                Value::Array(elems) => self.write_elements(elems)?,
                Value::Set(_) => return Err(self.violation("sets can only be object members")),
                _ => self.write_scalar(Tag::of(elem, self.config.binary.tag()), elem)?,
            }

            self.path.pop();
        }

        self.depth -= 1;
        self.newline();
        self.out.push(']');
        Ok(())
    }

    fn write_scalar(&mut self, tag: Tag, value: &Value) -> Result<(), SerializationError> {
        if let Value::Timestamp(t) = value {
            // RFC 3339 offsets are whole minutes and years have four digits
            if t.offset().local_minus_utc() % 60 != 0 {
                return Err(self.violation("timestamp offset is not a whole minute"));
            }
            if !(0..=9999).contains(&t.year()) {
                return Err(self.violation("timestamp year is outside 0000 to 9999"));
            }
        }

        // the only other scalar without a spelling is a non-finite float
        let payload = tag
            .encode(value)
            .ok_or_else(|| self.violation("float is not finite"))?;

        if tag.form() == Form::Text {
            write_string(&mut self.out, tag.as_str(), &payload);
        } else {
            self.out.push_str(&payload);
        }
        Ok(())
    }
}

/// Writes `"tag:body"` with `body` escaped.
fn write_string(out: &mut String, tag: &str, body: &str) {
    out.push('"');
    out.push_str(tag);
    out.push(crate::tag::DELIMITER);
    for c in body.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            c if c < ' ' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SerializationErrorKind;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn obj(members: Vec<(&str, Value)>) -> Value { Value::Object(members.into_iter().collect()) }

    fn pretty(width: usize) -> DumpConfig {
        DumpConfig {
            indent: Indent::Pretty(width),
            ..DumpConfig::default()
        }
    }

    #[test]
    fn empty_containers() {
        assert_eq!(dump(&Value::Array(vec![])).unwrap(), "[]");
        assert_eq!(dump(&obj(vec![])).unwrap(), "{}");
        assert_eq!(dump_with(&obj(vec![]), &pretty(4)).unwrap(), "{}");
        assert_eq!(
            dump(&obj(vec![("s", Value::Set(vec![])), ("a", Value::Array(vec![]))])).unwrap(),
            r#"{"set:s": [], "arr:a": []}"#
        );
    }

    #[test]
    fn scalars_are_self_tagged() {
        let v = obj(vec![
            ("s", Value::from("x")),
            ("i", Value::from(-7)),
            ("f", Value::Float(0.5)),
            ("b", Value::Bool(false)),
            ("n", Value::Null),
            (
                "t",
                Value::Timestamp(DateTime::parse_from_rfc3339("2016-10-02T07:31:51Z").unwrap()),
            ),
        ]);
        assert_eq!(
            dump(&v).unwrap(),
            r#"{"s:s": "s:x", "i:i": "i:-7", "f:f": 0.5, "bool:b": false, "null:n": null, "t:t": "t:2016-10-02T07:31:51Z"}"#
        );
    }

    #[test]
    fn elements() {
        let v = Value::Array(vec![
            Value::from(1),
            Value::Float(1.0),
            Value::Bool(true),
            Value::Null,
            Value::from("a:b"),
            Value::Array(vec![]),
        ]);
        assert_eq!(
            dump(&v).unwrap(),
            r#"["i:1", 1.0, true, null, "s:a:b", []]"#
        );
    }

    #[test]
    fn binary_encodings() {
        let v = obj(vec![("d", Value::from_static(b"Hello, world!"))]);
        let with = |binary| {
            dump_with(
                &v,
                &DumpConfig {
                    binary,
                    ..DumpConfig::default()
                },
            )
            .unwrap()
        };
        assert_eq!(with(BinaryEncoding::Base16), r#"{"b16:d": "b16:48656c6c6f2c20776f726c6421"}"#);
        assert_eq!(with(BinaryEncoding::Base32), r#"{"b32:d": "b32:jbswy3dpfqqho33snrscc"}"#);
        assert_eq!(with(BinaryEncoding::Base64), r#"{"b64:d": "b64:SGVsbG8sIHdvcmxkIQ"}"#);
    }

    #[test]
    fn pretty_layout() {
        let v = obj(vec![
            ("a", Value::from(vec![1.5])),
            ("o", obj(vec![("x", Value::Null)])),
        ]);
        assert_eq!(
            dump_with(&v, &pretty(2)).unwrap(),
            "{\n  \"arr:a\": [\n    1.5\n  ],\n  \"obj:o\": {\n    \"null:x\": null\n  }\n}"
        );
    }

    #[test]
    fn sorted_keys() {
        let v = obj(vec![
            ("b", Value::Null),
            ("a", obj(vec![("d", Value::Null), ("c", Value::Null)])),
        ]);
        let config = DumpConfig {
            key_order: KeyOrder::Sorted,
            ..DumpConfig::default()
        };
        assert_eq!(
            dump_with(&v, &config).unwrap(),
            r#"{"obj:a": {"null:c": null, "null:d": null}, "null:b": null}"#
        );
        assert_eq!(
            dump(&v).unwrap(),
            r#"{"null:b": null, "obj:a": {"null:d": null, "null:c": null}}"#
        );
    }

    #[test]
    fn escaping() {
        let v = obj(vec![("q\"k", Value::from("\\\n\u{1}é"))]);
        assert_eq!(dump(&v).unwrap(), r#"{"s:q\"k": "s:\\\n\u0001é"}"#);
    }

    #[test]
    fn duplicate_set_members() {
        let v = obj(vec![(
            "s",
            Value::Set(vec![Value::from(1), Value::from(2), Value::from(1)]),
        )]);
        let err = dump(&v).unwrap_err();
        assert_eq!(err.kind(), SerializationErrorKind::InvariantViolation);
        assert_eq!(err.path().to_string(), "$.s[2]");
    }

    #[test]
    fn non_finite_floats() {
        for f in &[std::f64::NAN, std::f64::INFINITY, std::f64::NEG_INFINITY] {
            let err = dump(&Value::Array(vec![Value::from(1), Value::Float(*f)])).unwrap_err();
            assert_eq!(err.path().to_string(), "$[1]");
        }
    }

    #[test]
    fn scalar_roots() {
        for v in &[
            Value::Null,
            Value::from("x"),
            Value::from(1),
            Value::Set(vec![]),
        ] {
            let err = dump(v).unwrap_err();
            assert_eq!(err.kind(), SerializationErrorKind::InvariantViolation);
            assert_eq!(err.path().to_string(), "$");
        }
    }

    fn at(offset_secs: i32) -> Value {
        let offset = FixedOffset::east_opt(offset_secs).unwrap();
        Value::Timestamp(
            Utc.with_ymd_and_hms(2016, 10, 2, 7, 31, 51)
                .unwrap()
                .with_timezone(&offset),
        )
    }

    #[test]
    fn sub_minute_offsets() {
        let v = Value::Array(vec![at(30)]);
        let err = dump(&v).unwrap_err();
        assert_eq!(err.kind(), SerializationErrorKind::InvariantViolation);
        assert_eq!(err.path().to_string(), "$[0]");

        let v = obj(vec![("t", at(-(5 * 3600 + 30 * 60 + 1)))]);
        assert_eq!(dump(&v).unwrap_err().path().to_string(), "$.t");

        // whole minutes are fine, and read back as the same instant
        let v = Value::Array(vec![at(5 * 3600 + 30 * 60)]);
        let text = dump(&v).unwrap();
        assert_eq!(text, r#"["t:2016-10-02T13:01:51+05:30"]"#);
        assert_eq!(crate::parse(&text).unwrap(), v);
    }

    #[test]
    fn years_outside_four_digits() {
        let ymd = |y| {
            Value::Array(vec![Value::from(
                Utc.with_ymd_and_hms(y, 1, 2, 23, 59, 59).unwrap(),
            )])
        };

        for y in &[10_000, -1] {
            let err = dump(&ymd(*y)).unwrap_err();
            assert_eq!(err.kind(), SerializationErrorKind::InvariantViolation);
            assert_eq!(err.path().to_string(), "$[0]");
        }

        for y in &[0, 9999] {
            let v = ymd(*y);
            assert_eq!(crate::parse(&dump(&v).unwrap()).unwrap(), v);
        }
    }

    fn nested(depth: usize) -> Value {
        (1..depth).fold(Value::Array(vec![]), |inner, _| Value::Array(vec![inner]))
    }

    #[test]
    fn nesting_limit() {
        let ok = nested(MAX_DEPTH);
        let text = dump(&ok).unwrap();
        assert_eq!(crate::parse(&text).unwrap(), ok);

        let err = dump(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(err.kind(), SerializationErrorKind::InvariantViolation);
        assert_eq!(err.path().segments().len(), MAX_DEPTH);

        // objects count too
        let deep = (0..MAX_DEPTH).fold(Value::Array(vec![]), |inner, _| {
            obj(vec![("x", inner)])
        });
        assert!(dump(&deep).is_err());
    }

    #[test]
    fn sets_only_as_members() {
        let v = obj(vec![("a", Value::Array(vec![Value::Set(vec![])]))]);
        assert_eq!(dump(&v).unwrap_err().path().to_string(), "$.a[0]");
    }
}

//! # TJSON parser
//!
//! A single-pass recursive descent parser. It reads the JSON structure and resolves
//! tags as it goes, so the first malformed node aborts the whole parse and no partial
//! tree is ever returned.
//!
//! # Example
//!
//! ```
//! use tjson::prelude::*;
//!
//! let v = parse(r#"{"set:ids": ["i:1", "i:2"], "t:at": "t:2016-10-02T07:31:51Z"}"#).unwrap();
//!
//! assert_eq!(v.get("ids").unwrap().to_set().unwrap().len(), 2);
//!
//! let err = parse(r#"{"set:ids": ["i:1", "i:1"]}"#).unwrap_err();
//!
//! assert_eq!(err.kind(), ParseErrorKind::DuplicateSetMember);
//! assert_eq!(err.path().to_string(), "$.ids[1]");
//! ```

use tracing::debug;

use crate::{
    errors::{ParseError, ParseErrorKind, Path, PathSegment},
    fields::Fields,
    tag::{self, Form, Tag},
    Value,
};

use ParseErrorKind::*;

/// Containers nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 256;

/// Parses TJSON text into a [`Value`].
///
/// The root must be an object or an array.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    debug!(bytes = text.len(), "parsing tjson document");
    Parser::new(text).parse_document()
}

/// Parses TJSON from raw bytes, failing with [`ParseErrorKind::Encoding`] if they are
/// not UTF-8.
///
/// ```
/// use tjson::prelude::*;
///
/// let err = parse_slice(b"[\"s:\xff\"]").unwrap_err();
///
/// assert_eq!(err.kind(), ParseErrorKind::Encoding);
/// assert_eq!(err.offset(), 4);
/// ```
pub fn parse_slice(bytes: &[u8]) -> Result<Value, ParseError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse(text),
        Err(e) => {
            Err(ParseError::new(
                Encoding,
                e.valid_up_to(),
                Path::root(),
                "input is not valid UTF-8",
            ))
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    path: Path,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            src,
            pos: 0,
            depth: 0,
            path: Path::root(),
        }
    }

    fn bytes(&self) -> &'a [u8] { self.src.as_bytes() }

    fn peek(&self) -> Option<u8> { self.bytes().get(self.pos).copied() }

    fn err(&self, kind: ParseErrorKind, at: usize, reason: &'static str) -> ParseError {
        ParseError::new(kind, at, self.path.clone(), reason)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8, reason: &'static str) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(Syntax, self.pos, reason))
        }
    }

    fn parse_document(mut self) -> Result<Value, ParseError> {
        self.skip_whitespace();
        let root = match self.peek() {
            Some(b'{') => Value::Object(self.parse_object()?),
            Some(b'[') => Value::Array(self.parse_elements()?),
            None => return Err(self.err(Syntax, self.pos, "empty document")),
            Some(_) => {
                // still report broken JSON as such
                let at = self.pos;
                self.skip_scalar()?;
                return Err(self.err(
                    UntaggedScalar,
                    at,
                    "toplevel elements other than object or array are disallowed",
                ));
            }
        };

        self.skip_whitespace();
        if self.pos != self.src.len() {
            return Err(self.err(TrailingData, self.pos, "data after the root value"));
        }

        Ok(root)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(self.err(Syntax, self.pos, "nesting too deep"))
        } else {
            Ok(())
        }
    }

    fn leave(&mut self) { self.depth -= 1; }

    /// Parses an object of tagged keys, starting at `{`.
    fn parse_object(&mut self) -> Result<Fields, ParseError> {
        self.enter()?;
        self.pos += 1;

        let mut fields = Fields::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.leave();
            return Ok(fields);
        }

        loop {
            self.skip_whitespace();
            let key_at = self.pos;
            if self.peek() != Some(b'"') {
                return Err(self.err(Syntax, key_at, "expected a string key"));
            }
            let key = self.parse_string()?;

            let (tag, name) = match tag::split(&key) {
                Some(pair) => pair,
                None => {
                    return Err(self.err(
                        UntaggedScalar,
                        key_at,
                        "invalid tag (missing ':' delimiter)",
                    ))
                }
            };
            let tag: Tag = tag
                .parse()
                .map_err(|e| ParseError::from_tag(e, key_at, self.path.clone()))?;

            self.path.push(PathSegment::Field(name.to_owned()));
            if fields.contains_key(name) {
                return Err(self.err(DuplicateKey, key_at, "duplicate field name"));
            }

            self.expect(b':', "expected ':' after key")?;
            let value = self.parse_member(tag)?;
            self.path.pop();

            fields.insert(name, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.err(Syntax, self.pos, "expected ',' or '}'")),
            }
        }

        self.leave();
        Ok(fields)
    }

    /// Parses the value of an object member governed by `tag`.
    fn parse_member(&mut self, tag: Tag) -> Result<Value, ParseError> {
        self.skip_whitespace();
        let at = self.pos;
        let found = self.peek_form()?;

        if found != tag.form() {
            if !matches!(found, Form::Array | Form::Object) {
                // still report broken JSON as such
                self.skip_scalar()?;
            }
            return Err(self.err(
                EncodingMismatch,
                at,
                "value does not have the JSON form its tag requires",
            ));
        }

        match tag {
            Tag::Object => self.parse_object().map(Value::Object),
            Tag::Array => self.parse_elements().map(Value::Array),
            Tag::Set => {
                let (members, offsets) = self.parse_elements_at()?;
                self.check_distinct(&members, &offsets)?;
                Ok(Value::Set(members))
            }
            _ => {
                let raw = self.parse_scalar_text()?;
                let payload = match raw.strip_prefix(tag.as_str()) {
                    Some(rest) if rest.starts_with(tag::DELIMITER) => &rest[1..],
                    _ => &raw[..],
                };
                tag.decode(payload)
                    .map_err(|e| ParseError::from_tag(e, at, self.path.clone()))
            }
        }
    }

    /// Parses an array of self-describing elements, starting at `[`.
    fn parse_elements(&mut self) -> Result<Vec<Value>, ParseError> {
        self.parse_elements_at().map(|(elems, _)| elems)
    }

    /// Like [`parse_elements`](Self::parse_elements), also returning the offset each
    /// element starts at.
    fn parse_elements_at(&mut self) -> Result<(Vec<Value>, Vec<usize>), ParseError> {
        self.enter()?;
        self.pos += 1;

        let mut elems = Vec::new();
        let mut offsets = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.leave();
            return Ok((elems, offsets));
        }

        loop {
            self.skip_whitespace();
            offsets.push(self.pos);
            self.path.push(PathSegment::Index(elems.len()));
            let elem = self.parse_element()?;
            self.path.pop();
            elems.push(elem);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.err(Syntax, self.pos, "expected ',' or ']'")),
            }
        }

        self.leave();
        Ok((elems, offsets))
    }

    /// Parses one array or set element.
    fn parse_element(&mut self) -> Result<Value, ParseError> {
        let at = self.pos;
        match self.peek_form()? {
            Form::Object => self.parse_object().map(Value::Object),
            Form::Array => self.parse_elements().map(Value::Array),
            Form::Text => {
                let raw = self.parse_string()?;
                let (tag, payload) = match tag::split(&raw) {
                    Some(pair) => pair,
                    None => {
                        return Err(self.err(
                            UntaggedScalar,
                            at,
                            "invalid tag (missing ':' delimiter)",
                        ))
                    }
                };
                let tag: Tag = tag
                    .parse()
                    .map_err(|e| ParseError::from_tag(e, at, self.path.clone()))?;
                if tag.form() != Form::Text {
                    return Err(self.err(
                        EncodingMismatch,
                        at,
                        "tag cannot be written as a string element",
                    ));
                }
                tag.decode(payload)
                    .map_err(|e| ParseError::from_tag(e, at, self.path.clone()))
            }
            form => {
                let tag = match form {
                    Form::Number => Tag::Float,
                    Form::Bool => Tag::Bool,
                    _ => Tag::Null,
                };
                let raw = self.parse_scalar_text()?;
                tag.decode(&raw)
                    .map_err(|e| ParseError::from_tag(e, at, self.path.clone()))
            }
        }
    }

    fn check_distinct(&mut self, members: &[Value], offsets: &[usize]) -> Result<(), ParseError> {
        for i in 1..members.len() {
            if members[..i].contains(&members[i]) {
                self.path.push(PathSegment::Index(i));
                return Err(self.err(DuplicateSetMember, offsets[i], "duplicate set member"));
            }
        }
        Ok(())
    }

    /// Classifies the value starting at the cursor without consuming it.
    fn peek_form(&self) -> Result<Form, ParseError> {
        match self.peek() {
            Some(b'{') => Ok(Form::Object),
            Some(b'[') => Ok(Form::Array),
            Some(b'"') => Ok(Form::Text),
            Some(b't') | Some(b'f') => Ok(Form::Bool),
            Some(b'n') => Ok(Form::Null),
            Some(b'-') | Some(b'0'..=b'9') => Ok(Form::Number),
            Some(_) => Err(self.err(Syntax, self.pos, "expected a JSON value")),
            None => Err(self.err(Syntax, self.pos, "unexpected end of input")),
        }
    }

    /// Consumes a string, number or literal and returns its payload text: the
    /// unescaped content for strings, the source text otherwise.
    fn parse_scalar_text(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(b'"') => self.parse_string(),
            _ => {
                let start = self.pos;
                self.skip_scalar()?;
                Ok(self.src[start..self.pos].to_owned())
            }
        }
    }

    /// Skips over a number or literal, or a whole string.
    fn skip_scalar(&mut self) -> Result<(), ParseError> {
        let rest = &self.bytes()[self.pos..];
        let len = match self.peek() {
            Some(b'"') => return self.parse_string().map(|_| ()),
            Some(b'-') | Some(b'0'..=b'9') => tag::scan_number(rest),
            Some(b't') if rest.starts_with(b"true") => 4,
            Some(b'f') if rest.starts_with(b"false") => 5,
            Some(b'n') if rest.starts_with(b"null") => 4,
            _ => 0,
        };
        if len == 0 {
            return Err(self.err(Syntax, self.pos, "expected a JSON value"));
        }
        self.pos += len;
        Ok(())
    }

    /// Parses a string starting at `"`, returning its unescaped content.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let open = self.pos;
        self.pos += 1;

        let mut out = String::new();
        let mut run = self.pos;

        loop {
            match self.peek() {
                None => return Err(self.err(Syntax, open, "unterminated string")),
                Some(b'"') => {
                    out.push_str(&self.src[run..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.src[run..self.pos]);
                    self.pos += 1;
                    let c = self.parse_escape()?;
                    out.push(c);
                    run = self.pos;
                }
                Some(b) if b < 0x20 => {
                    return Err(self.err(Syntax, self.pos, "control character in string"))
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Parses an escape sequence, the cursor is just past the backslash.
    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let at = self.pos - 1;
        let c = match self.peek() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\x08',
            Some(b'f') => '\x0c',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                self.pos += 1;
                return self.parse_unicode_escape(at);
            }
            _ => return Err(self.err(Syntax, at, "invalid escape sequence")),
        };
        self.pos += 1;
        Ok(c)
    }

    /// Parses the `XXXX` of a `\uXXXX` escape, pairing surrogates.
    fn parse_unicode_escape(&mut self, at: usize) -> Result<char, ParseError> {
        let high = self.parse_hex4(at)?;

        let code = match high {
            0xd800..=0xdbff => {
                if !self.bytes()[self.pos..].starts_with(b"\\u") {
                    return Err(self.err(Syntax, at, "unpaired surrogate"));
                }
                self.pos += 2;
                let low = self.parse_hex4(at)?;
                if !(0xdc00..=0xdfff).contains(&low) {
                    return Err(self.err(Syntax, at, "unpaired surrogate"));
                }
                0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00)
            }
            0xdc00..=0xdfff => return Err(self.err(Syntax, at, "unpaired surrogate")),
            _ => high,
        };

        std::char::from_u32(code).ok_or_else(|| self.err(Syntax, at, "invalid code point"))
    }

    fn parse_hex4(&mut self, at: usize) -> Result<u32, ParseError> {
        let digits = self
            .src
            .get(self.pos..self.pos + 4)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.err(Syntax, at, "invalid unicode escape"))?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| self.err(Syntax, at, "invalid unicode escape"))?;
        self.pos += 4;
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn kind(text: &str) -> ParseErrorKind { parse(text).unwrap_err().kind() }

    #[test]
    fn empty_containers() {
        assert_eq!(parse("[]").unwrap(), Value::Array(vec![]));
        assert_eq!(parse("{}").unwrap(), Value::Object(Fields::new()));
        assert_eq!(parse(" \n{ } \t").unwrap(), Value::Object(Fields::new()));
    }

    #[test]
    fn self_tagged_string_member() {
        let v = parse(r#"{"s:foo":"s:bar"}"#).unwrap();
        let fields = v.to_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("foo"), Some(&Value::from("bar")));
    }

    #[test]
    fn bare_payload_member() {
        let v = parse(r#"{"i:n":"123456789012345678901234567890"}"#).unwrap();
        let expected: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(v.get("n"), Some(&Value::Integer(expected)));

        // a different prefix is part of the text
        let v = parse(r#"{"s:a":"x:1"}"#).unwrap();
        assert_eq!(v.get("a"), Some(&Value::from("x:1")));

        // only one copy of the tag is stripped
        let v = parse(r#"{"s:a":"s:s:x"}"#).unwrap();
        assert_eq!(v.get("a"), Some(&Value::from("s:x")));
    }

    #[test]
    fn field_names_may_contain_delimiters() {
        let v = parse(r#"{"s:a:b": "s:c"}"#).unwrap();
        assert_eq!(v.get("a:b"), Some(&Value::from("c")));
    }

    #[test]
    fn duplicate_keys() {
        assert_eq!(kind(r#"{"s:a":"x:1","s:a":"x:2"}"#), DuplicateKey);
        // names are compared after the tag is stripped
        assert_eq!(kind(r#"{"s:a":"s:1","i:a":"i:2"}"#), DuplicateKey);

        let err = parse(r#"{"obj:o": {"s:k": "s:", "s:k": "s:"}}"#).unwrap_err();
        assert_eq!(err.path().to_string(), "$.o.k");
        assert_eq!(err.offset(), 24);
    }

    #[test]
    fn malformed_payloads() {
        assert_eq!(kind(r#"{"b64:data":"not-valid-base64!!"}"#), MalformedPayload);
        assert_eq!(kind(r#"["i:12x"]"#), MalformedPayload);
        assert_eq!(kind(r#"{"t:at":"yesterday"}"#), MalformedPayload);
    }

    #[test]
    fn untagged_scalars() {
        assert_eq!(kind(r#""hello""#), UntaggedScalar);
        assert_eq!(kind(r#""s:hello""#), UntaggedScalar);
        assert_eq!(kind("42"), UntaggedScalar);
        assert_eq!(kind("true"), UntaggedScalar);
        assert_eq!(kind(r#"["hello"]"#), UntaggedScalar);
        assert_eq!(kind(r#"[""]"#), UntaggedScalar);
        assert_eq!(kind(r#"{"foo":"s:bar"}"#), UntaggedScalar);
    }

    #[test]
    fn unknown_tags() {
        assert_eq!(kind(r#"{"x:foo":"s:bar"}"#), UnknownTag);
        assert_eq!(kind(r#"["x:1"]"#), UnknownTag);
    }

    #[test]
    fn encoding_mismatches() {
        // wrong JSON form for the tag
        assert_eq!(kind(r#"{"s:a": 1}"#), EncodingMismatch);
        assert_eq!(kind(r#"{"f:a": "1.5"}"#), EncodingMismatch);
        assert_eq!(kind(r#"{"arr:a": {}}"#), EncodingMismatch);
        assert_eq!(kind(r#"{"obj:a": []}"#), EncodingMismatch);
        assert_eq!(kind(r#"{"bool:a": null}"#), EncodingMismatch);
        // tags without a string form cannot tag elements
        assert_eq!(kind(r#"["f:1.5"]"#), EncodingMismatch);
        assert_eq!(kind(r#"["set:"]"#), EncodingMismatch);
        // dialect
        assert_eq!(kind(r#"["b16:ABCD"]"#), EncodingMismatch);
    }

    #[test]
    fn elements_describe_themselves() {
        let v = parse(r#"[42, 1.5, true, null, [], {}, "s:x", "b32:mzxw6"]"#).unwrap();
        assert_eq!(
            v,
            Value::Array(vec![
                Value::Float(42.0),
                Value::Float(1.5),
                Value::Bool(true),
                Value::Null,
                Value::Array(vec![]),
                Value::Object(Fields::new()),
                Value::from("x"),
                Value::from_static(b"foo"),
            ])
        );
    }

    #[test]
    fn governed_literals() {
        let v = parse(r#"{"bool:yes": true, "null:nothing": null, "f:pi": 3.25}"#).unwrap();
        assert_eq!(v.get("yes"), Some(&Value::Bool(true)));
        assert_eq!(v.get("nothing"), Some(&Value::Null));
        assert_eq!(v.get("pi"), Some(&Value::Float(3.25)));
    }

    #[test]
    fn sets() {
        let v = parse(r#"{"set:s": ["i:1", "s:1", 1]}"#).unwrap();
        assert_eq!(v.get("s").unwrap().to_set().unwrap().len(), 3);

        let err = parse(r#"{"set:s": ["i:1", "s:x", "i:1"]}"#).unwrap_err();
        assert_eq!(err.kind(), DuplicateSetMember);
        assert_eq!(err.path().to_string(), "$.s[2]");

        // structurally equal containers
        assert_eq!(
            kind(r#"{"set:s": [{"i:a": "1"}, {"i:a": "i:1"}]}"#),
            DuplicateSetMember
        );
        // same bytes from different encodings
        assert_eq!(kind(r#"{"set:s": ["b64:Zm9v", "b32:mzxw6"]}"#), DuplicateSetMember);
    }

    #[test]
    fn syntax_errors() {
        for bad in &[
            "",
            "[",
            "[1,]",
            "[1 2]",
            r#"{"s:a" "s:b"}"#,
            r#"{"s:a": "s:b",}"#,
            "[01]",
            "[1.]",
            "[tru]",
            r#"["s:\x"]"#,
            r#"["s:\ud800"]"#,
            "[\"s:\u{1}\"]",
            r#"{1: 2}"#,
        ] {
            assert_eq!(kind(bad), Syntax, "{:?}", bad);
        }
    }

    #[test]
    fn trailing_data() {
        assert_eq!(kind("[] []"), TrailingData);
        assert_eq!(kind("{}x"), TrailingData);
        let err = parse("[]  ,").unwrap_err();
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn escapes() {
        let v = parse(r#"["s:\"\\\/\b\f\n\r\t\u00e9\ud83d\ude00"]"#).unwrap();
        assert_eq!(
            v,
            Value::Array(vec![Value::from("\"\\/\u{8}\u{c}\n\r\té\u{1f600}")])
        );
    }

    #[test]
    fn escaped_keys_are_unescaped_before_splitting() {
        let v = parse(r#"{"\u0073:k": "s:v"}"#).unwrap();
        assert_eq!(v.get("k"), Some(&Value::from("v")));
    }

    #[test]
    fn error_paths() {
        let err = parse(r#"{"arr:a": ["s:ok", {"obj:b": {"i:c": "nope"}}]}"#).unwrap_err();
        assert_eq!(err.kind(), MalformedPayload);
        assert_eq!(err.path().to_string(), "$.a[1].b.c");
    }

    #[test]
    fn nesting_limit() {
        let deep = "[".repeat(MAX_DEPTH + 1) + &"]".repeat(MAX_DEPTH + 1);
        assert_eq!(kind(&deep), Syntax);

        let ok = "[".repeat(MAX_DEPTH) + &"]".repeat(MAX_DEPTH);
        assert!(parse(&ok).is_ok());
    }

    #[test]
    fn invalid_utf8() {
        assert_eq!(parse_slice(b"[\xc3\x28]").unwrap_err().kind(), Encoding);
        assert!(parse_slice(b"[\"s:\xc3\xa9\"]").is_ok());
    }
}

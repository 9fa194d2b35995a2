//! Structured errors for the grammar, the parser and the serializer.
//!
//! Errors never carry formatted messages; every one is a kind plus a location, so
//! callers can match on the kind and present the location however they like.

use std::{error::Error, fmt};

use crate::tag::Tag;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// One step of a JSON path.
pub enum PathSegment {
    /// An object field, by its tag-stripped name.
    Field(String),
    /// An array or set element.
    Index(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
/// The location of a node inside a document, from the root down.
///
/// Displays as `$` for the root, `.name` for fields and `[n]` for elements.
///
/// ```
/// use tjson::prelude::*;
///
/// let err = parse(r#"{"arr:xs": ["s:ok", "nope"]}"#).unwrap_err();
///
/// assert_eq!(err.path().to_string(), "$.xs[1]");
/// ```
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The root path.
    pub fn root() -> Self { Path(Vec::new()) }

    /// The segments of this path, outermost first.
    pub fn segments(&self) -> &[PathSegment] { &self.0 }

    pub(crate) fn push(&mut self, seg: PathSegment) { self.0.push(seg) }

    pub(crate) fn pop(&mut self) { self.0.pop(); }
}

impl From<Vec<PathSegment>> for Path {
    fn from(v: Vec<PathSegment>) -> Path { Path(v) }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("$")?;
        for seg in &self.0 {
            match seg {
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Ways a `(tag, payload)` pair can fail to resolve.
pub enum TagErrorKind {
    /// The tag is not in the grammar.
    UnknownTag,
    /// The payload is not valid for the tag.
    MalformedPayload,
    /// The payload is in a neighbouring dialect of the tag's encoding, or has the
    /// wrong JSON shape for the tag.
    EncodingMismatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// An error produced by the tag grammar.
pub struct TagError {
    kind: TagErrorKind,
    tag: Option<Tag>,
    reason: &'static str,
}

impl TagError {
    pub(crate) fn unknown() -> Self {
        TagError {
            kind: TagErrorKind::UnknownTag,
            tag: None,
            reason: "unrecognized tag",
        }
    }

    pub(crate) fn malformed(tag: Tag, reason: &'static str) -> Self {
        TagError {
            kind: TagErrorKind::MalformedPayload,
            tag: Some(tag),
            reason,
        }
    }

    pub(crate) fn mismatch(tag: Tag, reason: &'static str) -> Self {
        TagError {
            kind: TagErrorKind::EncodingMismatch,
            tag: Some(tag),
            reason,
        }
    }

    /// The kind of failure.
    pub fn kind(&self) -> TagErrorKind { self.kind }

    /// The tag the payload was checked against, `None` for unknown tags.
    pub fn tag(&self) -> Option<Tag> { self.tag }

    /// A short description of what was wrong.
    pub fn reason(&self) -> &'static str { self.reason }
}

impl Error for TagError {}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{:?} for tag `{}`: {}", self.kind, tag, self.reason),
            None => write!(f, "{:?}: {}", self.kind, self.reason),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Ways parsing can fail.
pub enum ParseErrorKind {
    /// The input is not UTF-8.
    Encoding,
    /// The input is not well-formed JSON.
    Syntax,
    /// See [`TagErrorKind::UnknownTag`].
    UnknownTag,
    /// See [`TagErrorKind::MalformedPayload`].
    MalformedPayload,
    /// See [`TagErrorKind::EncodingMismatch`].
    EncodingMismatch,
    /// Two keys of one object share a field name.
    DuplicateKey,
    /// Two members of one set are structurally equal.
    DuplicateSetMember,
    /// Something other than whitespace follows the root value.
    TrailingData,
    /// A key, string element or root value carries no tag.
    UntaggedScalar,
}

impl From<TagErrorKind> for ParseErrorKind {
    fn from(k: TagErrorKind) -> ParseErrorKind {
        match k {
            TagErrorKind::UnknownTag => ParseErrorKind::UnknownTag,
            TagErrorKind::MalformedPayload => ParseErrorKind::MalformedPayload,
            TagErrorKind::EncodingMismatch => ParseErrorKind::EncodingMismatch,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// An error encountered when parsing fails.
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
    path: Path,
    reason: &'static str,
}

impl ParseError {
    pub(crate) fn new(
        kind: ParseErrorKind,
        offset: usize,
        path: Path,
        reason: &'static str,
    ) -> Self {
        ParseError {
            kind,
            offset,
            path,
            reason,
        }
    }

    pub(crate) fn from_tag(err: TagError, offset: usize, path: Path) -> Self {
        ParseError::new(err.kind.into(), offset, path, err.reason)
    }

    /// The kind of failure.
    pub fn kind(&self) -> ParseErrorKind { self.kind }

    /// Byte offset into the input where the offending token starts.
    pub fn offset(&self) -> usize { self.offset }

    /// Path to the offending node.
    pub fn path(&self) -> &Path { &self.path }

    /// A short description of what was wrong.
    pub fn reason(&self) -> &'static str { self.reason }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{kind:?} at {path} (byte {offset}): {reason}",
            kind = self.kind,
            path = self.path,
            offset = self.offset,
            reason = self.reason,
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Ways serialization can fail.
pub enum SerializationErrorKind {
    /// The tree breaks an invariant that `parse` would never let through.
    InvariantViolation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// An error encountered when a value tree cannot be written out.
pub struct SerializationError {
    kind: SerializationErrorKind,
    path: Path,
    reason: &'static str,
}

impl SerializationError {
    pub(crate) fn invariant(path: Path, reason: &'static str) -> Self {
        SerializationError {
            kind: SerializationErrorKind::InvariantViolation,
            path,
            reason,
        }
    }

    /// The kind of failure.
    pub fn kind(&self) -> SerializationErrorKind { self.kind }

    /// Path to the offending node.
    pub fn path(&self) -> &Path { &self.path }

    /// A short description of the broken invariant.
    pub fn reason(&self) -> &'static str { self.reason }
}

impl Error for SerializationError {}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.kind, self.path, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_display() {
        let path = Path::from(vec![
            PathSegment::Field("a".into()),
            PathSegment::Index(3),
            PathSegment::Field("b:c".into()),
        ]);
        assert_eq!(path.to_string(), "$.a[3].b:c");
        assert_eq!(path.segments()[1], PathSegment::Index(3));
        assert!(Path::root().segments().is_empty());
        assert_eq!(Path::root().to_string(), "$");
    }

    #[test]
    fn tag_kinds_carry_over() {
        let err = ParseError::from_tag(
            TagError::mismatch(Tag::Base16, "Base16 data must be lowercase"),
            7,
            Path::root(),
        );
        assert_eq!(err.kind(), ParseErrorKind::EncodingMismatch);
        assert_eq!(err.offset(), 7);
        assert_eq!(err.reason(), "Base16 data must be lowercase");
    }
}

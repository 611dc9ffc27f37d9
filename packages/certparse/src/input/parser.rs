//! Bounds-checked TLV reader over an [`Input`]
//!
//! The tag octet is read directly; the length is decoded by `der::Length`,
//! which enforces definite, minimally encoded DER lengths. Every nested
//! parser increments the depth counter and parsing fails once it passes
//! [`MAX_NESTING_DEPTH`].

use der::{Decode, Length, Reader, SliceReader};

use super::buffer::Input;
use super::tag::Tag;
use crate::error::{DecodeError, DecodeResult};

/// Deepest allowed nesting of constructed values
pub const MAX_NESTING_DEPTH: usize = 32;

/// One decoded tag-length-value element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    /// Identifier octet
    pub tag: Tag,
    /// The complete encoding, header included
    pub tlv: Input,
    /// The contents octets only
    pub value: Input,
}

/// Sequential reader over DER elements
#[derive(Debug, Clone)]
pub struct Parser {
    input: Input,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Start reading `input` at nesting depth 0
    #[must_use]
    pub fn new(input: Input) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Absolute offset of the next unread byte
    #[must_use]
    pub fn offset(&self) -> usize {
        self.input.offset() + self.pos
    }

    /// True if unread bytes remain
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pos < self.input.len()
    }

    /// Tag of the next element without consuming it
    #[must_use]
    pub fn peek_tag(&self) -> Option<Tag> {
        self.input.as_bytes().get(self.pos).copied().map(Tag::from_octet)
    }

    /// Decode the header of the next element: `(tag, header_len, value_len)`
    fn read_header(&self) -> DecodeResult<(Tag, usize, usize)> {
        let offset = self.offset();
        let remaining = self
            .input
            .as_bytes()
            .get(self.pos..)
            .ok_or(DecodeError::Truncated { offset })?;
        let (&first, rest) = remaining
            .split_first()
            .ok_or(DecodeError::Truncated { offset })?;
        let tag = Tag::from_octet(first);
        if tag.is_high_tag_number() {
            return Err(DecodeError::HighTagNumber { offset });
        }

        let length_offset = offset + 1;
        let mut reader =
            SliceReader::new(rest).map_err(|source| DecodeError::Length {
                offset: length_offset,
                source,
            })?;
        let length = Length::decode(&mut reader).map_err(|source| DecodeError::Length {
            offset: length_offset,
            source,
        })?;
        let length_len = usize::try_from(reader.position()).map_err(|source| {
            DecodeError::Length {
                offset: length_offset,
                source,
            }
        })?;
        let value_len = usize::try_from(length).map_err(|source| DecodeError::Length {
            offset: length_offset,
            source,
        })?;

        let header_len = 1 + length_len;
        let available = remaining.len() - header_len;
        if value_len > available {
            return Err(DecodeError::Truncated { offset });
        }
        Ok((tag, header_len, value_len))
    }

    /// Read the next element, whatever its tag
    pub fn read_tlv(&mut self) -> DecodeResult<Tlv> {
        let (tag, header_len, value_len) = self.read_header()?;
        let start = self.pos;
        let value_start = start + header_len;
        let end = value_start + value_len;
        let tlv = Tlv {
            tag,
            tlv: self.input.slice(start..end),
            value: self.input.slice(value_start..end),
        };
        self.pos = end;
        Ok(tlv)
    }

    /// Read the next element, which must carry `expected`; returns its contents
    pub fn read_tag(&mut self, expected: Tag) -> DecodeResult<Input> {
        Ok(self.read_tlv_with_tag(expected)?.value)
    }

    /// Read the next element, which must carry `expected`
    pub fn read_tlv_with_tag(&mut self, expected: Tag) -> DecodeResult<Tlv> {
        let offset = self.offset();
        match self.peek_tag() {
            None => Err(DecodeError::MissingElement { offset, expected }),
            Some(actual) if actual != expected => Err(DecodeError::UnexpectedTag {
                offset,
                expected,
                actual,
            }),
            Some(_) => self.read_tlv(),
        }
    }

    /// Read the next element only if it carries `tag`
    pub fn read_optional_tag(&mut self, tag: Tag) -> DecodeResult<Option<Input>> {
        if self.peek_tag() == Some(tag) {
            Ok(Some(self.read_tlv()?.value))
        } else {
            Ok(None)
        }
    }

    /// Read a SEQUENCE and return a parser over its contents
    pub fn read_sequence(&mut self) -> DecodeResult<Parser> {
        self.read_constructed(Tag::SEQUENCE)
    }

    /// Read a constructed element with `tag` and return a parser over its contents
    pub fn read_constructed(&mut self, tag: Tag) -> DecodeResult<Parser> {
        let value = self.read_tag(tag)?;
        self.nested(value)
    }

    /// Read an optional constructed element with `tag`
    pub fn read_optional_constructed(&mut self, tag: Tag) -> DecodeResult<Option<Parser>> {
        match self.read_optional_tag(tag)? {
            Some(value) => Ok(Some(self.nested(value)?)),
            None => Ok(None),
        }
    }

    /// A parser over `value` one nesting level below this one
    pub fn nested(&self, value: Input) -> DecodeResult<Parser> {
        let depth = self.depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                offset: value.offset(),
                limit: MAX_NESTING_DEPTH,
            });
        }
        Ok(Parser {
            input: value,
            pos: 0,
            depth,
        })
    }

    /// Fail if any bytes remain unread
    pub fn finish(&self) -> DecodeResult<()> {
        if self.has_more() {
            return Err(DecodeError::TrailingData {
                offset: self.offset(),
            });
        }
        Ok(())
    }
}

/// Contents of a TLV that must be exactly one SEQUENCE
pub fn sequence_value(tlv: &Input) -> DecodeResult<Input> {
    let mut parser = Parser::new(tlv.clone());
    let value = parser.read_tag(Tag::SEQUENCE)?;
    parser.finish()?;
    Ok(value)
}

//! OBJECT IDENTIFIER values viewed in place
//!
//! Any structurally valid encoding is accepted, whatever its length or the
//! size of its arcs. The well-known identifiers in [`crate::oids`] are
//! `const-oid` constants and compare against an [`Oid`] by encoded bytes.

use std::borrow::Borrow;
use std::fmt;

use const_oid::ObjectIdentifier;

use super::buffer::Input;
use super::parser::Parser;
use super::tag::Tag;
use crate::error::{DecodeError, DecodeResult};

/// OBJECT IDENTIFIER contents
///
/// Equality, ordering and hashing are those of the encoded bytes, so an
/// `Oid` can be looked up in maps by `&[u8]`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Input);

impl Oid {
    /// Validate OBJECT IDENTIFIER contents
    ///
    /// Every subidentifier must be minimally encoded (no leading `0x80`
    /// octet) and the last octet must terminate a subidentifier.
    pub fn parse(value: &Input) -> DecodeResult<Self> {
        let bytes = value.as_bytes();
        let invalid = |reason| DecodeError::invalid(value.offset(), "object identifier", reason);
        match bytes.last() {
            None => {
                return Err(DecodeError::Empty {
                    offset: value.offset(),
                    what: "OBJECT IDENTIFIER",
                })
            }
            Some(last) if last & 0x80 != 0 => return Err(invalid("truncated subidentifier")),
            Some(_) => {}
        }

        let mut starts_subidentifier = true;
        for &byte in bytes {
            if starts_subidentifier && byte == 0x80 {
                return Err(invalid("non-minimal subidentifier"));
            }
            starts_subidentifier = byte & 0x80 == 0;
        }
        Ok(Self(value.clone()))
    }

    /// The encoded contents, without tag and length
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The underlying view
    #[must_use]
    pub fn input(&self) -> &Input {
        &self.0
    }

    /// The `const-oid` form, `None` if the encoding exceeds its limits
    #[must_use]
    pub fn to_object_identifier(&self) -> Option<ObjectIdentifier> {
        ObjectIdentifier::from_bytes(self.as_bytes()).ok()
    }

    /// Arcs in dotted order, `None` if one does not fit in 128 bits
    fn arcs(&self) -> Option<Vec<u128>> {
        let mut subidentifiers = Vec::new();
        let mut current: u128 = 0;
        for &byte in self.as_bytes() {
            current = current.checked_mul(128)?.checked_add(u128::from(byte & 0x7F))?;
            if byte & 0x80 == 0 {
                subidentifiers.push(current);
                current = 0;
            }
        }

        let (&first, rest) = subidentifiers.split_first()?;
        let mut arcs = match first {
            0..=39 => vec![0, first],
            40..=79 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };
        arcs.extend_from_slice(rest);
        Some(arcs)
    }
}

impl From<ObjectIdentifier> for Oid {
    fn from(oid: ObjectIdentifier) -> Self {
        Self(Input::copy_from_slice(oid.as_bytes()))
    }
}

impl Borrow<[u8]> for Oid {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq<ObjectIdentifier> for Oid {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<Oid> for ObjectIdentifier {
    fn eq(&self, other: &Oid) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(arcs) = self.arcs() else {
            return write!(f, "oid:{}", hex::encode(self.as_bytes()));
        };
        for (i, arc) in arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{arc}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({self})")
    }
}

/// Decode OBJECT IDENTIFIER contents
pub fn parse_oid(value: &Input) -> DecodeResult<Oid> {
    Oid::parse(value)
}

/// Read the next element as an OBJECT IDENTIFIER
pub fn read_oid(parser: &mut Parser) -> DecodeResult<Oid> {
    let value = parser.read_tag(Tag::OID)?;
    Oid::parse(&value)
}

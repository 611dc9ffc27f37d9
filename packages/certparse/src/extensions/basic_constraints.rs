//! BasicConstraints (2.5.29.19)

use crate::error::DecodeResult;
use crate::input::{parse_bool, parse_u8, sequence_value, Input, Parser, Tag};

/// ```text
/// BasicConstraints ::= SEQUENCE {
///      cA                      BOOLEAN DEFAULT FALSE,
///      pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BasicConstraints {
    /// Whether the subject is a CA
    pub is_ca: bool,
    /// Maximum number of intermediate certificates that may follow
    pub path_len: Option<u8>,
}

/// Decode a BasicConstraints extension value
///
/// An explicitly encoded `cA FALSE` is accepted even though DER requires the
/// default to be omitted; many deployed certificates contain it.
pub fn decode_basic_constraints(value: &Input) -> DecodeResult<BasicConstraints> {
    let mut parser = Parser::new(sequence_value(value)?);

    let is_ca = match parser.peek_tag() {
        Some(Tag::BOOLEAN) => parse_bool(&parser.read_tlv()?)?,
        _ => false,
    };
    let path_len = match parser.read_optional_tag(Tag::INTEGER)? {
        Some(integer) => Some(parse_u8(&integer)?),
        None => None,
    };
    parser.finish()?;

    Ok(BasicConstraints { is_ca, path_len })
}

//! ExtendedKeyUsage (2.5.29.37)

use crate::error::{DecodeError, DecodeResult};
use crate::input::{read_oid, sequence_value, Input, Oid, Parser};

/// Decode an ExtendedKeyUsage extension value
///
/// `ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId`. The
/// purposes are returned in encoding order.
pub fn decode_extended_key_usage(value: &Input) -> DecodeResult<Vec<Oid>> {
    let mut parser = Parser::new(sequence_value(value)?);
    if !parser.has_more() {
        return Err(DecodeError::Empty {
            offset: parser.offset(),
            what: "ExtKeyUsageSyntax",
        });
    }

    let mut purposes = Vec::new();
    while parser.has_more() {
        purposes.push(read_oid(&mut parser)?);
    }
    Ok(purposes)
}

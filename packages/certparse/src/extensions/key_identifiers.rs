//! AuthorityKeyIdentifier (2.5.29.35) and SubjectKeyIdentifier (2.5.29.14)

use crate::error::{DecodeError, DecodeResult};
use crate::input::{sequence_value, validate_integer, Input, Parser, Tag};

use super::general_names::GeneralNames;

/// ```text
/// AuthorityKeyIdentifier ::= SEQUENCE {
///     keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///     authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///     authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AuthorityKeyIdentifier {
    /// keyIdentifier contents
    pub key_identifier: Option<Input>,
    /// authorityCertIssuer
    pub authority_cert_issuer: Option<GeneralNames>,
    /// authorityCertSerialNumber INTEGER contents
    pub authority_cert_serial_number: Option<Input>,
}

/// Decode an AuthorityKeyIdentifier extension value
///
/// authorityCertIssuer and authorityCertSerialNumber must be present
/// together or not at all (RFC 5280 section 4.2.1.1).
pub fn decode_authority_key_identifier(value: &Input) -> DecodeResult<AuthorityKeyIdentifier> {
    let mut parser = Parser::new(sequence_value(value)?);

    let key_identifier = parser.read_optional_tag(Tag::context_specific(0))?;

    let issuer_offset = parser.offset();
    let authority_cert_issuer =
        match parser.read_optional_constructed(Tag::context_specific_constructed(1))? {
            Some(mut names) => Some(GeneralNames::read_contents(&mut names, false)?),
            None => None,
        };

    let authority_cert_serial_number = parser.read_optional_tag(Tag::context_specific(2))?;
    if let Some(serial) = &authority_cert_serial_number {
        validate_integer(serial)?;
    }
    parser.finish()?;

    if authority_cert_issuer.is_some() != authority_cert_serial_number.is_some() {
        return Err(DecodeError::invalid(
            issuer_offset,
            "AuthorityKeyIdentifier",
            "authorityCertIssuer and authorityCertSerialNumber must appear together",
        ));
    }

    Ok(AuthorityKeyIdentifier {
        key_identifier,
        authority_cert_issuer,
        authority_cert_serial_number,
    })
}

/// Decode a SubjectKeyIdentifier extension value (`KeyIdentifier ::= OCTET STRING`)
pub fn decode_subject_key_identifier(value: &Input) -> DecodeResult<Input> {
    let mut parser = Parser::new(value.clone());
    let key_identifier = parser.read_tag(Tag::OCTET_STRING)?;
    parser.finish()?;
    Ok(key_identifier)
}

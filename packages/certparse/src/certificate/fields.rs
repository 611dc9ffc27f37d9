//! Certificate and TBSCertificate field decoding
//!
//! ```text
//! Certificate  ::=  SEQUENCE  {
//!      tbsCertificate       TBSCertificate,
//!      signatureAlgorithm   AlgorithmIdentifier,
//!      signatureValue       BIT STRING  }
//!
//! TBSCertificate  ::=  SEQUENCE  {
//!      version         [0]  EXPLICIT Version DEFAULT v1,
//!      serialNumber         CertificateSerialNumber,
//!      signature            AlgorithmIdentifier,
//!      issuer               Name,
//!      validity             Validity,
//!      subject              Name,
//!      subjectPublicKeyInfo SubjectPublicKeyInfo,
//!      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
//!      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
//!      extensions      [3]  EXPLICIT Extensions OPTIONAL }
//! ```

use certparse_common::{CertErrors, Diagnostic};
use chrono::{DateTime, Utc};

use crate::error::{DecodeError, DecodeResult};
use crate::input::{
    integer_is_negative, parse_time, validate_integer, BitString, Input, Parser, Tag,
};
use crate::options::ParseCertificateOptions;

/// Serial numbers longer than this violate RFC 5280 section 4.1.2.2
const MAX_SERIAL_NUMBER_LEN: usize = 20;

/// Certificate version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CertificateVersion {
    /// v1 (no version field encoded)
    V1,
    /// v2
    V2,
    /// v3
    V3,
}

/// The three top-level fields of a Certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateFields {
    /// Complete TBSCertificate TLV
    pub tbs_certificate_tlv: Input,
    /// Complete signatureAlgorithm TLV
    pub signature_algorithm_tlv: Input,
    /// The signature value
    pub signature_value: BitString,
}

/// Raw and lightly decoded TBSCertificate fields
///
/// Name, algorithm and key fields are kept as complete TLVs for the
/// consumers that verify signatures and match names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTbsCertificate {
    /// Certificate version
    pub version: CertificateVersion,
    /// Contents of the serialNumber INTEGER
    pub serial_number: Input,
    /// Complete TBS `signature` AlgorithmIdentifier TLV
    pub signature_algorithm_tlv: Input,
    /// Complete issuer Name TLV
    pub issuer_tlv: Input,
    /// Start of the validity period
    pub validity_not_before: DateTime<Utc>,
    /// End of the validity period
    pub validity_not_after: DateTime<Utc>,
    /// Complete subject Name TLV
    pub subject_tlv: Input,
    /// Complete SubjectPublicKeyInfo TLV
    pub spki_tlv: Input,
    /// issuerUniqueID, v2 and v3 only
    pub issuer_unique_id: Option<BitString>,
    /// subjectUniqueID, v2 and v3 only
    pub subject_unique_id: Option<BitString>,
    /// Complete Extensions SEQUENCE TLV, v3 only
    pub extensions_tlv: Option<Input>,
}

/// Split a Certificate into its three fields
///
/// Nothing may follow the Certificate SEQUENCE, and nothing may follow the
/// signature inside it.
pub fn parse_certificate(certificate: &Input) -> DecodeResult<CertificateFields> {
    let mut outer = Parser::new(certificate.clone());
    let mut certificate_parser = outer.read_sequence()?;
    outer.finish()?;

    let tbs_certificate_tlv = certificate_parser.read_tlv_with_tag(Tag::SEQUENCE)?.tlv;
    let signature_algorithm_tlv = certificate_parser.read_tlv_with_tag(Tag::SEQUENCE)?.tlv;
    let signature = certificate_parser.read_tag(Tag::BIT_STRING)?;
    let signature_value = BitString::parse(&signature)?;
    certificate_parser.finish()?;

    Ok(CertificateFields {
        tbs_certificate_tlv,
        signature_algorithm_tlv,
        signature_value,
    })
}

/// Decode a complete TBSCertificate TLV
///
/// Non-fatal findings (negative or zero serial numbers, tolerated over-long
/// serials) are appended to `errors` as warnings.
pub fn parse_tbs_certificate(
    tbs_tlv: &Input,
    options: &ParseCertificateOptions,
    errors: &mut CertErrors,
) -> DecodeResult<ParsedTbsCertificate> {
    let mut outer = Parser::new(tbs_tlv.clone());
    let mut tbs = outer.read_sequence()?;
    outer.finish()?;

    let version = match tbs.read_optional_constructed(Tag::context_specific_constructed(0))? {
        Some(mut explicit) => {
            let value = explicit.read_tag(Tag::INTEGER)?;
            explicit.finish()?;
            parse_version(&value)?
        }
        None => CertificateVersion::V1,
    };

    let serial_number = tbs.read_tag(Tag::INTEGER)?;
    verify_serial_number(&serial_number, options, errors)?;

    let signature_algorithm_tlv = tbs.read_tlv_with_tag(Tag::SEQUENCE)?.tlv;
    let issuer_tlv = tbs.read_tlv_with_tag(Tag::SEQUENCE)?.tlv;

    let mut validity = tbs.read_sequence()?;
    let validity_not_before = parse_time(&validity.read_tlv()?)?;
    let validity_not_after = parse_time(&validity.read_tlv()?)?;
    validity.finish()?;

    let subject_tlv = tbs.read_tlv_with_tag(Tag::SEQUENCE)?.tlv;
    let spki_tlv = tbs.read_tlv_with_tag(Tag::SEQUENCE)?.tlv;

    let issuer_unique_id = read_unique_id(&mut tbs, 1, version)?;
    let subject_unique_id = read_unique_id(&mut tbs, 2, version)?;

    let extensions_offset = tbs.offset();
    let extensions_tlv = match tbs.read_optional_constructed(Tag::context_specific_constructed(3))? {
        Some(mut explicit) => {
            if version != CertificateVersion::V3 {
                return Err(DecodeError::invalid(
                    extensions_offset,
                    "extensions",
                    "only allowed in v3 certificates",
                ));
            }
            let tlv = explicit.read_tlv_with_tag(Tag::SEQUENCE)?.tlv;
            explicit.finish()?;
            Some(tlv)
        }
        None => None,
    };

    tbs.finish()?;

    Ok(ParsedTbsCertificate {
        version,
        serial_number,
        signature_algorithm_tlv,
        issuer_tlv,
        validity_not_before,
        validity_not_after,
        subject_tlv,
        spki_tlv,
        issuer_unique_id,
        subject_unique_id,
        extensions_tlv,
    })
}

/// Version ::= INTEGER { v1(0), v2(1), v3(2) }
///
/// DER forbids encoding the DEFAULT, so an explicit v1 is rejected.
fn parse_version(value: &Input) -> DecodeResult<CertificateVersion> {
    validate_integer(value)?;
    match value.as_bytes() {
        [1] => Ok(CertificateVersion::V2),
        [2] => Ok(CertificateVersion::V3),
        [0] => Err(DecodeError::invalid(
            value.offset(),
            "version",
            "v1 must be omitted rather than encoded",
        )),
        _ => Err(DecodeError::invalid(
            value.offset(),
            "version",
            "unsupported certificate version",
        )),
    }
}

/// CertificateSerialNumber ::= INTEGER
///
/// A non-minimal INTEGER or one longer than 20 octets is fatal unless
/// `allow_invalid_serial_numbers` is set, in which case it is a warning.
/// Empty contents are always fatal.
fn verify_serial_number(
    value: &Input,
    options: &ParseCertificateOptions,
    errors: &mut CertErrors,
) -> DecodeResult<()> {
    if value.is_empty() {
        return Err(DecodeError::Empty {
            offset: value.offset(),
            what: "serialNumber",
        });
    }
    let invalid = validate_integer(value).err().or_else(|| {
        (value.len() > MAX_SERIAL_NUMBER_LEN).then(|| {
            DecodeError::invalid(value.offset(), "serialNumber", "longer than 20 octets")
        })
    });
    if let Some(err) = invalid {
        if !options.allow_invalid_serial_numbers {
            return Err(err);
        }
        errors.add(
            Diagnostic::warning(format!("accepted invalid serial number: {err}"))
                .with_offset(value.offset()),
        );
    }

    if integer_is_negative(value) {
        errors.add(Diagnostic::warning("serial number is negative").with_offset(value.offset()));
    } else if value.as_bytes() == [0] {
        errors.add(Diagnostic::warning("serial number is zero").with_offset(value.offset()));
    }
    Ok(())
}

/// UniqueIdentifier ::= BIT STRING, tagged `[number]` IMPLICIT
fn read_unique_id(
    tbs: &mut Parser,
    number: u8,
    version: CertificateVersion,
) -> DecodeResult<Option<BitString>> {
    let offset = tbs.offset();
    match tbs.read_optional_tag(Tag::context_specific(number))? {
        Some(_) if version == CertificateVersion::V1 => Err(DecodeError::invalid(
            offset,
            "unique identifier",
            "not allowed in v1 certificates",
        )),
        Some(value) => Ok(Some(BitString::parse(&value)?)),
        None => Ok(None),
    }
}

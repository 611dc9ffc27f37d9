//! Primitive DER value decoders
//!
//! BOOLEAN and IA5String are handed to the `der` crate. Times are decoded into
//! `chrono` values, which cover the full RFC 5280 range including years
//! before 1970. INTEGER and BIT STRING are checked here because the parser
//! needs zero-copy views of their contents rather than owned values.

use chrono::{DateTime, NaiveDate, Utc};
use der::asn1::Ia5StringRef;
use der::Decode;

use super::buffer::Input;
use super::oid::{read_oid, Oid};
use super::parser::{Parser, Tlv};
use super::tag::Tag;
use crate::error::{DecodeError, DecodeResult};

/// Decode a complete BOOLEAN TLV
pub fn parse_bool(tlv: &Tlv) -> DecodeResult<bool> {
    bool::from_der(tlv.tlv.as_bytes()).map_err(|source| DecodeError::Der {
        offset: tlv.tlv.offset(),
        tag: Tag::BOOLEAN,
        source,
    })
}

/// Check INTEGER contents are non-empty and minimally encoded
pub fn validate_integer(value: &Input) -> DecodeResult<()> {
    match value.as_bytes() {
        [] => Err(DecodeError::Empty {
            offset: value.offset(),
            what: "INTEGER",
        }),
        [0x00, next, ..] if next & 0x80 == 0 => Err(DecodeError::invalid(
            value.offset(),
            "INTEGER",
            "non-minimal encoding",
        )),
        [0xFF, next, ..] if next & 0x80 != 0 => Err(DecodeError::invalid(
            value.offset(),
            "INTEGER",
            "non-minimal encoding",
        )),
        _ => Ok(()),
    }
}

/// True if validated INTEGER contents encode a negative number
#[must_use]
pub fn integer_is_negative(value: &Input) -> bool {
    value.as_bytes().first().is_some_and(|b| b & 0x80 != 0)
}

/// Decode INTEGER contents as an unsigned value in `0..=255`
pub fn parse_u8(value: &Input) -> DecodeResult<u8> {
    validate_integer(value)?;
    if integer_is_negative(value) {
        return Err(DecodeError::invalid(value.offset(), "INTEGER", "negative value"));
    }
    match value.as_bytes() {
        [n] => Ok(*n),
        [0x00, n] => Ok(*n),
        _ => Err(DecodeError::invalid(
            value.offset(),
            "INTEGER",
            "value does not fit in 8 bits",
        )),
    }
}

/// Decode INTEGER contents as an unsigned value in `0..=u32::MAX`
pub fn parse_u32(value: &Input) -> DecodeResult<u32> {
    validate_integer(value)?;
    if integer_is_negative(value) {
        return Err(DecodeError::invalid(value.offset(), "INTEGER", "negative value"));
    }
    let bytes = match value.as_bytes() {
        [0x00, rest @ ..] if !rest.is_empty() => rest,
        bytes => bytes,
    };
    if bytes.len() > 4 {
        return Err(DecodeError::invalid(
            value.offset(),
            "INTEGER",
            "value does not fit in 32 bits",
        ));
    }
    Ok(bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
}

/// A DER BIT STRING viewed in place
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    unused_bits: u8,
    bytes: Input,
}

impl BitString {
    /// Decode BIT STRING contents (leading unused-bit count, then data)
    ///
    /// Rejects more than 7 unused bits, unused bits on an empty string, and
    /// non-zero padding bits, as DER requires.
    pub fn parse(value: &Input) -> DecodeResult<Self> {
        let offset = value.offset();
        let (&unused_bits, data) = value.as_bytes().split_first().ok_or(DecodeError::Empty {
            offset,
            what: "BIT STRING",
        })?;
        if unused_bits > 7 {
            return Err(DecodeError::invalid(offset, "BIT STRING", "more than 7 unused bits"));
        }
        match data.last() {
            None if unused_bits != 0 => {
                return Err(DecodeError::invalid(
                    offset,
                    "BIT STRING",
                    "unused bits on an empty bit string",
                ));
            }
            Some(last) if last & ((1u8 << unused_bits) - 1) != 0 => {
                return Err(DecodeError::invalid(
                    offset,
                    "BIT STRING",
                    "padding bits are not zero",
                ));
            }
            _ => {}
        }
        Ok(Self {
            unused_bits,
            bytes: value.slice(1..value.len()),
        })
    }

    /// Number of unused bits in the final octet
    #[must_use]
    pub fn unused_bits(&self) -> u8 {
        self.unused_bits
    }

    /// Data octets, without the leading unused-bit count
    #[must_use]
    pub fn bytes(&self) -> &Input {
        &self.bytes
    }

    /// Number of significant bits
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 - usize::from(self.unused_bits)
    }

    /// True if bit `bit` (0 = most significant bit of the first octet) is set
    #[must_use]
    pub fn asserts_bit(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false;
        }
        self.bytes
            .as_bytes()
            .get(bit / 8)
            .is_some_and(|byte| byte & (0x80 >> (bit % 8)) != 0)
    }

    /// True if at least one bit is set
    #[must_use]
    pub fn any_bit_set(&self) -> bool {
        self.bytes.as_bytes().iter().any(|b| *b != 0)
    }
}

/// Decode a UTCTime or GeneralizedTime TLV
///
/// Both forms must be `Z`-terminated with seconds precision and no
/// fraction (RFC 5280 section 4.1.2.5). UTCTime years 50..=99 are 19YY and
/// 00..=49 are 20YY.
pub fn parse_time(tlv: &Tlv) -> DecodeResult<DateTime<Utc>> {
    let offset = tlv.tlv.offset();
    let (what, digits) = match (tlv.tag, tlv.value.as_bytes()) {
        (Tag::UTC_TIME, [digits @ .., b'Z']) if digits.len() == 12 => ("UTCTime", digits),
        (Tag::GENERALIZED_TIME, [digits @ .., b'Z']) if digits.len() == 14 => {
            ("GeneralizedTime", digits)
        }
        (Tag::UTC_TIME, _) => {
            return Err(DecodeError::invalid(offset, "UTCTime", "expected YYMMDDHHMMSSZ"))
        }
        (Tag::GENERALIZED_TIME, _) => {
            return Err(DecodeError::invalid(
                offset,
                "GeneralizedTime",
                "expected YYYYMMDDHHMMSSZ",
            ))
        }
        (actual, _) => {
            return Err(DecodeError::UnexpectedTag {
                offset,
                expected: Tag::UTC_TIME,
                actual,
            })
        }
    };
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(DecodeError::invalid(offset, what, "non-digit in time value"));
    }

    let number = |field: &[u8]| field.iter().fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));
    let (year, rest) = if digits.len() == 12 {
        let yy = number(&digits[..2]);
        (if yy >= 50 { 1900 + yy } else { 2000 + yy }, &digits[2..])
    } else {
        (number(&digits[..4]), &digits[4..])
    };
    let [month, day, hour, minute, second] =
        [0, 2, 4, 6, 8].map(|at| number(&rest[at..at + 2]));

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|time| time.and_utc())
        .ok_or_else(|| DecodeError::invalid(offset, what, "not a calendar date and time"))
}

/// An IA5String value, validated as 7-bit ASCII and viewed in place
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ia5Text(Input);

impl Ia5Text {
    /// Validate IA5String contents
    pub fn parse(value: &Input) -> DecodeResult<Self> {
        Ia5StringRef::new(value.as_bytes()).map_err(|source| DecodeError::Der {
            offset: value.offset(),
            tag: Tag::IA5_STRING,
            source,
        })?;
        Ok(Self(value.clone()))
    }

    /// The text
    #[must_use]
    pub fn as_str(&self) -> &str {
        // ASCII was checked in `parse`
        std::str::from_utf8(self.0.as_bytes()).unwrap_or_default()
    }

    /// The underlying view
    #[must_use]
    pub fn input(&self) -> &Input {
        &self.0
    }
}

impl std::fmt::Display for Ia5Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AlgorithmIdentifier ::= SEQUENCE { algorithm OID, parameters ANY OPTIONAL }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    /// The algorithm OID
    pub oid: Oid,
    /// Complete TLV of the parameters, if present
    pub parameters: Option<Tlv>,
}

impl AlgorithmIdentifier {
    /// Decode from a parser positioned at the AlgorithmIdentifier SEQUENCE
    pub fn read(parser: &mut Parser) -> DecodeResult<Self> {
        let mut inner = parser.read_sequence()?;
        let oid = read_oid(&mut inner)?;
        let parameters = if inner.has_more() {
            Some(inner.read_tlv()?)
        } else {
            None
        };
        inner.finish()?;
        Ok(Self { oid, parameters })
    }

    /// True if parameters are absent or an ASN.1 NULL
    #[must_use]
    pub fn parameters_absent_or_null(&self) -> bool {
        match &self.parameters {
            None => true,
            Some(tlv) => tlv.tag == Tag::NULL && tlv.value.is_empty(),
        }
    }
}

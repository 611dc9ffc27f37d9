//! Distinguished name normalization
//!
//! Produces a canonical re-encoding of an RDNSequence so that names differing
//! only in string type, letter case or spacing compare byte-equal:
//!
//! - DirectoryString values (PrintableString, UTF8String, TeletexString,
//!   UniversalString, BMPString) are converted to UTF-8, trimmed, internal
//!   runs of spaces collapsed, ASCII letters lower-cased, and re-encoded as
//!   UTF8String
//! - any other value type is copied verbatim
//! - the attributes of each RDN are sorted in DER SET OF order

use der::asn1::{BmpString, PrintableStringRef, TeletexStringRef, Utf8StringRef};
use thiserror::Error;

use crate::error::DecodeError;
use crate::input::{encode_tlv, read_oid, write_tlv, Input, Parser, Tag};

/// Why a name could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The Name structure itself is malformed
    #[error(transparent)]
    Malformed(#[from] DecodeError),

    /// A DirectoryString value is not valid for its string type
    #[error("{tag} value at offset {offset} is not a valid string")]
    InvalidString {
        /// Where the value starts
        offset: usize,
        /// The string type
        tag: Tag,
    },

    /// The normalized form could not be encoded
    #[error("re-encoding failed: {0}")]
    Encoding(der::Error),
}

impl From<der::Error> for NormalizeError {
    fn from(err: der::Error) -> Self {
        NormalizeError::Encoding(err)
    }
}

/// Normalize the contents of a Name (the RDNSequence without its outer tag)
///
/// The result excludes the outer SEQUENCE tag as well.
pub fn normalize_name(name_value: &Input) -> Result<Vec<u8>, NormalizeError> {
    let mut rdn_sequence = Parser::new(name_value.clone());
    let mut normalized = Vec::with_capacity(name_value.len());

    while rdn_sequence.has_more() {
        let mut rdn = rdn_sequence.read_constructed(Tag::SET)?;
        if !rdn.has_more() {
            return Err(DecodeError::Empty {
                offset: rdn.offset(),
                what: "RelativeDistinguishedName",
            }
            .into());
        }

        let mut attributes = Vec::new();
        while rdn.has_more() {
            attributes.push(normalize_attribute(&mut rdn)?);
        }
        // DER SET OF ordering
        attributes.sort();
        write_tlv(&mut normalized, Tag::SET, &attributes.concat())?;
    }

    Ok(normalized)
}

/// AttributeTypeAndValue ::= SEQUENCE { type OBJECT IDENTIFIER, value ANY }
fn normalize_attribute(rdn: &mut Parser) -> Result<Vec<u8>, NormalizeError> {
    let mut atv = rdn.read_sequence()?;
    let type_tlv = atv.read_tlv_with_tag(Tag::OID)?;
    read_oid(&mut Parser::new(type_tlv.tlv.clone()))?;
    let value = atv.read_tlv()?;
    atv.finish()?;

    let mut content = type_tlv.tlv.as_bytes().to_vec();
    match decode_directory_string(value.tag, &value.value)? {
        Some(text) => write_tlv(&mut content, Tag::UTF8_STRING, fold(&text).as_bytes())?,
        None => content.extend_from_slice(value.tlv.as_bytes()),
    }
    Ok(encode_tlv(Tag::SEQUENCE, &content)?)
}

/// Decode a DirectoryString choice to text; `None` for types left verbatim
fn decode_directory_string(tag: Tag, value: &Input) -> Result<Option<String>, NormalizeError> {
    let bytes = value.as_bytes();
    let invalid = || NormalizeError::InvalidString {
        offset: value.offset(),
        tag,
    };

    let text = match tag {
        Tag::PRINTABLE_STRING => PrintableStringRef::new(bytes).map_err(|_| invalid())?.to_string(),
        Tag::UTF8_STRING => Utf8StringRef::new(bytes).map_err(|_| invalid())?.to_string(),
        Tag::BMP_STRING => BmpString::from_ucs2(bytes).map_err(|_| invalid())?.to_string(),
        Tag::TELETEX_STRING => match TeletexStringRef::new(bytes) {
            Ok(text) => text.to_string(),
            // octets above 0x7F are read as Latin-1
            Err(_) => bytes.iter().map(|b| char::from(*b)).collect(),
        },
        // UCS-4, which `der` has no type for
        Tag::UNIVERSAL_STRING => {
            if bytes.len() % 4 != 0 {
                return Err(invalid());
            }
            bytes
                .chunks_exact(4)
                .map(|c| char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
                .collect::<Option<String>>()
                .ok_or_else(invalid)?
        }
        _ => return Ok(None),
    };
    Ok(Some(text))
}

/// Trim, collapse runs of spaces and lower-case ASCII letters
fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().map(|c| c.to_ascii_lowercase()));
    }
    out
}

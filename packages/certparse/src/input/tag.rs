//! Raw ASN.1 identifier octets
//!
//! Tags are kept as the raw identifier byte rather than [`der::Tag`] because
//! certificates in the wild carry string types (UniversalString, 0x1C) that
//! `der::Tag` cannot represent. Only the low-tag-number form is supported,
//! which covers every tag used by RFC 5280.

use std::fmt;

/// A single-octet ASN.1 tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u8);

const CONSTRUCTED: u8 = 0x20;
const CONTEXT_SPECIFIC: u8 = 0x80;

impl Tag {
    /// BOOLEAN
    pub const BOOLEAN: Tag = Tag(0x01);
    /// INTEGER
    pub const INTEGER: Tag = Tag(0x02);
    /// BIT STRING
    pub const BIT_STRING: Tag = Tag(0x03);
    /// OCTET STRING
    pub const OCTET_STRING: Tag = Tag(0x04);
    /// NULL
    pub const NULL: Tag = Tag(0x05);
    /// OBJECT IDENTIFIER
    pub const OID: Tag = Tag(0x06);
    /// UTF8String
    pub const UTF8_STRING: Tag = Tag(0x0C);
    /// PrintableString
    pub const PRINTABLE_STRING: Tag = Tag(0x13);
    /// TeletexString (T61String)
    pub const TELETEX_STRING: Tag = Tag(0x14);
    /// IA5String
    pub const IA5_STRING: Tag = Tag(0x16);
    /// UTCTime
    pub const UTC_TIME: Tag = Tag(0x17);
    /// GeneralizedTime
    pub const GENERALIZED_TIME: Tag = Tag(0x18);
    /// UniversalString
    pub const UNIVERSAL_STRING: Tag = Tag(0x1C);
    /// BMPString
    pub const BMP_STRING: Tag = Tag(0x1E);
    /// SEQUENCE / SEQUENCE OF
    pub const SEQUENCE: Tag = Tag(0x30);
    /// SET / SET OF
    pub const SET: Tag = Tag(0x31);

    /// Wrap a raw identifier octet
    #[must_use]
    pub const fn from_octet(octet: u8) -> Self {
        Tag(octet)
    }

    /// Primitive context-specific tag `[number]`
    #[must_use]
    pub const fn context_specific(number: u8) -> Self {
        Tag(CONTEXT_SPECIFIC | (number & 0x1F))
    }

    /// Constructed context-specific tag `[number]`
    #[must_use]
    pub const fn context_specific_constructed(number: u8) -> Self {
        Tag(CONTEXT_SPECIFIC | CONSTRUCTED | (number & 0x1F))
    }

    /// The identifier octet
    #[must_use]
    pub const fn octet(self) -> u8 {
        self.0
    }

    /// True if the constructed bit is set
    #[must_use]
    pub const fn is_constructed(self) -> bool {
        self.0 & CONSTRUCTED != 0
    }

    /// True if the tag uses the high-tag-number form (`number == 31`)
    #[must_use]
    pub const fn is_high_tag_number(self) -> bool {
        self.0 & 0x1F == 0x1F
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

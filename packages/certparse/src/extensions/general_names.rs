//! GeneralName and GeneralNames decoding
//!
//! ```text
//! GeneralName ::= CHOICE {
//!      otherName                 [0]  OtherName,
//!      rfc822Name                [1]  IA5String,
//!      dNSName                   [2]  IA5String,
//!      x400Address               [3]  ORAddress,
//!      directoryName             [4]  Name,
//!      ediPartyName              [5]  EDIPartyName,
//!      uniformResourceIdentifier [6]  IA5String,
//!      iPAddress                 [7]  OCTET STRING,
//!      registeredID              [8]  OBJECT IDENTIFIER }
//! ```
//!
//! Inside a certificate an iPAddress is a 4 or 16 octet address. Inside name
//! constraints it is an address followed by a netmask of the same length.

use std::fmt;

use crate::error::{DecodeError, DecodeResult};
use crate::input::{parse_oid, sequence_value, Ia5Text, Input, Oid, Parser, Tag, Tlv};

/// The GeneralName CHOICE alternatives, as bit flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum GeneralNameType {
    /// otherName \[0\]
    OtherName = 1 << 0,
    /// rfc822Name \[1\]
    Rfc822Name = 1 << 1,
    /// dNSName \[2\]
    DnsName = 1 << 2,
    /// x400Address \[3\]
    X400Address = 1 << 3,
    /// directoryName \[4\]
    DirectoryName = 1 << 4,
    /// ediPartyName \[5\]
    EdiPartyName = 1 << 5,
    /// uniformResourceIdentifier \[6\]
    UniformResourceIdentifier = 1 << 6,
    /// iPAddress \[7\]
    IpAddress = 1 << 7,
    /// registeredID \[8\]
    RegisteredId = 1 << 8,
}

/// Set of [`GeneralNameType`]s seen while decoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GeneralNameTypes(u16);

impl GeneralNameTypes {
    /// The empty set
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// True if `kind` is in the set
    #[must_use]
    pub fn contains(self, kind: GeneralNameType) -> bool {
        self.0 & kind as u16 != 0
    }

    /// True if no name type is in the set
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit mask
    #[must_use]
    pub fn bits(self) -> u16 {
        self.0
    }

    pub(crate) fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    fn insert(&mut self, kind: GeneralNameType) {
        self.0 |= kind as u16;
    }
}

/// An iPAddress name constraint: address plus netmask
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpAddressRange {
    /// Network address, 4 or 16 octets
    pub address: Input,
    /// Netmask of the same length, contiguous leading ones
    pub mask: Input,
}

impl IpAddressRange {
    /// Length of the netmask prefix in bits
    #[must_use]
    pub fn prefix_len(&self) -> u32 {
        self.mask.as_bytes().iter().map(|b| b.count_ones()).sum()
    }
}

/// One decoded GeneralName
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeneralName {
    /// otherName contents, undecoded
    OtherName(Input),
    /// rfc822Name
    Rfc822Name(Ia5Text),
    /// dNSName
    DnsName(Ia5Text),
    /// x400Address contents, undecoded
    X400Address(Input),
    /// directoryName: contents of the Name SEQUENCE
    DirectoryName(Input),
    /// ediPartyName contents, undecoded
    EdiPartyName(Input),
    /// uniformResourceIdentifier
    UniformResourceIdentifier(Ia5Text),
    /// iPAddress in a certificate name, 4 or 16 octets
    IpAddress(Input),
    /// iPAddress in a name constraint
    IpAddressRange(IpAddressRange),
    /// registeredID
    RegisteredId(Oid),
}

impl GeneralName {
    /// Which CHOICE alternative this is
    #[must_use]
    pub fn name_type(&self) -> GeneralNameType {
        match self {
            GeneralName::OtherName(_) => GeneralNameType::OtherName,
            GeneralName::Rfc822Name(_) => GeneralNameType::Rfc822Name,
            GeneralName::DnsName(_) => GeneralNameType::DnsName,
            GeneralName::X400Address(_) => GeneralNameType::X400Address,
            GeneralName::DirectoryName(_) => GeneralNameType::DirectoryName,
            GeneralName::EdiPartyName(_) => GeneralNameType::EdiPartyName,
            GeneralName::UniformResourceIdentifier(_) => GeneralNameType::UniformResourceIdentifier,
            GeneralName::IpAddress(_) | GeneralName::IpAddressRange(_) => {
                GeneralNameType::IpAddress
            }
            GeneralName::RegisteredId(_) => GeneralNameType::RegisteredId,
        }
    }

    /// Decode one GeneralName TLV
    ///
    /// `ip_address_ranges` selects the name-constraints form of iPAddress.
    pub(crate) fn parse(tlv: &Tlv, parser: &Parser, ip_address_ranges: bool) -> DecodeResult<Self> {
        let value = &tlv.value;
        let name = match tlv.tag.octet() {
            0xA0 => GeneralName::OtherName(value.clone()),
            0x81 => GeneralName::Rfc822Name(Ia5Text::parse(value)?),
            0x82 => GeneralName::DnsName(Ia5Text::parse(value)?),
            0xA3 => GeneralName::X400Address(value.clone()),
            0xA4 => {
                // EXPLICIT: the tag wraps exactly one Name SEQUENCE
                let mut explicit = parser.nested(value.clone())?;
                let name = explicit.read_tag(Tag::SEQUENCE)?;
                explicit.finish()?;
                GeneralName::DirectoryName(name)
            }
            0xA5 => GeneralName::EdiPartyName(value.clone()),
            0x86 => GeneralName::UniformResourceIdentifier(Ia5Text::parse(value)?),
            0x87 if ip_address_ranges => GeneralName::IpAddressRange(parse_ip_range(value)?),
            0x87 => {
                if !matches!(value.len(), 4 | 16) {
                    return Err(DecodeError::invalid(
                        value.offset(),
                        "iPAddress",
                        "must be 4 or 16 octets",
                    ));
                }
                GeneralName::IpAddress(value.clone())
            }
            0x88 => GeneralName::RegisteredId(parse_oid(value)?),
            _ => {
                return Err(DecodeError::invalid(
                    tlv.tlv.offset(),
                    "GeneralName",
                    "unknown CHOICE tag",
                ))
            }
        };
        Ok(name)
    }
}

impl fmt::Display for GeneralName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralName::Rfc822Name(text) => write!(f, "email:{text}"),
            GeneralName::DnsName(text) => write!(f, "DNS:{text}"),
            GeneralName::UniformResourceIdentifier(text) => write!(f, "URI:{text}"),
            GeneralName::IpAddress(addr) => write!(f, "IP:{}", format_ip(addr.as_bytes())),
            GeneralName::IpAddressRange(range) => write!(
                f,
                "IP:{}/{}",
                format_ip(range.address.as_bytes()),
                range.prefix_len()
            ),
            GeneralName::RegisteredId(oid) => write!(f, "RID:{oid}"),
            GeneralName::OtherName(_) => f.write_str("othername:<unsupported>"),
            GeneralName::X400Address(_) => f.write_str("X400Name:<unsupported>"),
            GeneralName::DirectoryName(_) => f.write_str("DirName:<name>"),
            GeneralName::EdiPartyName(_) => f.write_str("EdiPartyName:<unsupported>"),
        }
    }
}

fn format_ip(bytes: &[u8]) -> String {
    match bytes {
        [a, b, c, d] => std::net::Ipv4Addr::new(*a, *b, *c, *d).to_string(),
        _ => match <[u8; 16]>::try_from(bytes) {
            Ok(octets) => std::net::Ipv6Addr::from(octets).to_string(),
            Err(_) => hex::encode(bytes),
        },
    }
}

fn parse_ip_range(value: &Input) -> DecodeResult<IpAddressRange> {
    let half = match value.len() {
        8 => 4,
        32 => 16,
        _ => {
            return Err(DecodeError::invalid(
                value.offset(),
                "iPAddress constraint",
                "must be 8 or 32 octets",
            ))
        }
    };
    let mask = value.slice(half..value.len());

    // Leading ones followed only by zeros
    let mut seen_zero = false;
    for byte in mask.as_bytes() {
        let contiguous = if seen_zero {
            *byte == 0
        } else {
            byte.leading_ones() + byte.trailing_zeros() >= 8
        };
        if !contiguous {
            return Err(DecodeError::invalid(
                mask.offset(),
                "iPAddress constraint",
                "netmask is not contiguous",
            ));
        }
        seen_zero |= *byte != 0xFF;
    }

    Ok(IpAddressRange {
        address: value.slice(0..half),
        mask,
    })
}

/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GeneralNames {
    names: Vec<GeneralName>,
    present_name_types: GeneralNameTypes,
}

impl GeneralNames {
    /// Decode a complete GeneralNames TLV (the SubjectAltName extension value)
    pub fn parse(tlv: &Input) -> DecodeResult<Self> {
        let value = sequence_value(tlv)?;
        let mut parser = Parser::new(value);
        Self::read_contents(&mut parser, false)
    }

    /// Decode the GeneralName elements remaining in `parser`; at least one is required
    pub(crate) fn read_contents(parser: &mut Parser, ip_address_ranges: bool) -> DecodeResult<Self> {
        if !parser.has_more() {
            return Err(DecodeError::Empty {
                offset: parser.offset(),
                what: "GeneralNames",
            });
        }
        let mut names = Self::default();
        while parser.has_more() {
            let tlv = parser.read_tlv()?;
            names.push(GeneralName::parse(&tlv, parser, ip_address_ranges)?);
        }
        Ok(names)
    }

    pub(crate) fn push(&mut self, name: GeneralName) {
        self.present_name_types.insert(name.name_type());
        self.names.push(name);
    }

    /// All names in encounter order
    pub fn iter(&self) -> impl Iterator<Item = &GeneralName> {
        self.names.iter()
    }

    /// Number of names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if there are no names
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Which GeneralName alternatives appeared
    #[must_use]
    pub fn present_name_types(&self) -> GeneralNameTypes {
        self.present_name_types
    }

    /// dNSName values
    pub fn dns_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::DnsName(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// rfc822Name values
    pub fn rfc822_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::Rfc822Name(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// uniformResourceIdentifier values
    pub fn uniform_resource_identifiers(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::UniformResourceIdentifier(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// iPAddress values (certificate form)
    pub fn ip_addresses(&self) -> impl Iterator<Item = &Input> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::IpAddress(addr) => Some(addr),
            _ => None,
        })
    }

    /// iPAddress values (name constraint form)
    pub fn ip_address_ranges(&self) -> impl Iterator<Item = &IpAddressRange> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::IpAddressRange(range) => Some(range),
            _ => None,
        })
    }

    /// directoryName values, each the contents of a Name SEQUENCE
    pub fn directory_names(&self) -> impl Iterator<Item = &Input> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::DirectoryName(name) => Some(name),
            _ => None,
        })
    }

    /// registeredID values
    pub fn registered_ids(&self) -> impl Iterator<Item = &Oid> {
        self.names.iter().filter_map(|n| match n {
            GeneralName::RegisteredId(oid) => Some(oid),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a GeneralNames {
    type Item = &'a GeneralName;
    type IntoIter = std::slice::Iter<'a, GeneralName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Decode a SubjectAltName extension value
pub fn decode_subject_alt_name(value: &Input) -> DecodeResult<GeneralNames> {
    GeneralNames::parse(value)
}

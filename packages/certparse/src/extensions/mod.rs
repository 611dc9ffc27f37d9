//! Certificate extensions
//!
//! [`parse_extensions`] turns the Extensions SEQUENCE into a registry of
//! [`ParsedExtension`]s keyed by the encoded OID bytes, so any well-formed
//! OID can be registered and looked up. The twelve extensions this crate
//! understands are listed in [`ExtensionKind`]; each has a standalone
//! `decode_*` function that takes the extension value and nothing else, and
//! [`KnownExtension`] holds the typed result of any of them.

use std::collections::BTreeMap;
use std::fmt;

use const_oid::ObjectIdentifier;

use crate::error::{CertError, DecodeError, DecodeResult, Result};
use crate::input::{parse_bool, read_oid, sequence_value, Input, Oid, Parser, Tag};
use crate::oids;

mod authority_info_access;
mod basic_constraints;
mod extended_key_usage;
mod general_names;
mod key_identifiers;
mod key_usage;
mod name_constraints;
mod policies;

pub use authority_info_access::{decode_authority_info_access, AccessDescription, AuthorityInfoAccess};
pub use basic_constraints::{decode_basic_constraints, BasicConstraints};
pub use extended_key_usage::decode_extended_key_usage;
pub use general_names::{
    decode_subject_alt_name, GeneralName, GeneralNameType, GeneralNameTypes, GeneralNames,
    IpAddressRange,
};
pub use key_identifiers::{
    decode_authority_key_identifier, decode_subject_key_identifier, AuthorityKeyIdentifier,
};
pub use key_usage::{decode_key_usage, KeyUsage, KeyUsageBit};
pub use name_constraints::{decode_name_constraints, NameConstraints};
pub use policies::{
    decode_certificate_policies, decode_inhibit_any_policy, decode_policy_constraints,
    decode_policy_mappings, CertificatePolicies, PolicyConstraints, PolicyInformation,
    PolicyMapping, PolicyQualifierInfo,
};

/// One entry of the Extensions SEQUENCE
///
/// ```text
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedExtension {
    /// extnID
    pub oid: Oid,
    /// critical
    pub critical: bool,
    /// Contents of the extnValue OCTET STRING
    pub value: Input,
}

/// All extensions of one certificate, keyed by OID
///
/// `Oid` borrows as `[u8]`, so entries can be fetched with the encoded OID
/// contents, e.g. `map.get(oids::KEY_USAGE.as_bytes())`.
pub type ExtensionsMap = BTreeMap<Oid, ParsedExtension>;

/// Decode a complete Extensions SEQUENCE TLV into the registry
///
/// The sequence must hold at least one extension and no OID may repeat.
pub fn parse_extensions(extensions_tlv: &Input) -> Result<ExtensionsMap> {
    let malformed = CertError::malformed;
    let mut parser =
        Parser::new(sequence_value(extensions_tlv).map_err(malformed("extensions"))?);
    if !parser.has_more() {
        return Err(CertError::Malformed {
            field: "extensions",
            source: DecodeError::Empty {
                offset: parser.offset(),
                what: "Extensions",
            },
        });
    }

    let mut extensions = ExtensionsMap::new();
    while parser.has_more() {
        let offset = parser.offset();
        let extension = read_extension(&mut parser).map_err(malformed("extension"))?;
        if extensions.contains_key(&extension.oid) {
            return Err(CertError::DuplicateExtension {
                oid: extension.oid,
                offset,
            });
        }
        extensions.insert(extension.oid.clone(), extension);
    }
    Ok(extensions)
}

fn read_extension(parser: &mut Parser) -> DecodeResult<ParsedExtension> {
    let mut extension = parser.read_sequence()?;
    let oid = read_oid(&mut extension)?;

    // An explicit FALSE is not DER, but is common enough to accept
    let critical = match extension.peek_tag() {
        Some(Tag::BOOLEAN) => parse_bool(&extension.read_tlv()?)?,
        _ => false,
    };

    let value = extension.read_tag(Tag::OCTET_STRING)?;
    extension.finish()?;
    Ok(ParsedExtension {
        oid,
        critical,
        value,
    })
}

/// The extensions decoded into typed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtensionKind {
    /// 2.5.29.19
    BasicConstraints,
    /// 2.5.29.15
    KeyUsage,
    /// 2.5.29.37
    ExtendedKeyUsage,
    /// 2.5.29.17
    SubjectAltName,
    /// 2.5.29.30
    NameConstraints,
    /// 1.3.6.1.5.5.7.1.1
    AuthorityInfoAccess,
    /// 2.5.29.32
    CertificatePolicies,
    /// 2.5.29.36
    PolicyConstraints,
    /// 2.5.29.33
    PolicyMappings,
    /// 2.5.29.54
    InhibitAnyPolicy,
    /// 2.5.29.35
    AuthorityKeyIdentifier,
    /// 2.5.29.14
    SubjectKeyIdentifier,
}

impl ExtensionKind {
    /// Every kind, in decoding order
    pub const ALL: [ExtensionKind; 12] = [
        ExtensionKind::BasicConstraints,
        ExtensionKind::KeyUsage,
        ExtensionKind::ExtendedKeyUsage,
        ExtensionKind::SubjectAltName,
        ExtensionKind::NameConstraints,
        ExtensionKind::AuthorityInfoAccess,
        ExtensionKind::CertificatePolicies,
        ExtensionKind::PolicyConstraints,
        ExtensionKind::PolicyMappings,
        ExtensionKind::InhibitAnyPolicy,
        ExtensionKind::AuthorityKeyIdentifier,
        ExtensionKind::SubjectKeyIdentifier,
    ];

    /// The extension OID
    #[must_use]
    pub const fn oid(self) -> ObjectIdentifier {
        match self {
            ExtensionKind::BasicConstraints => oids::BASIC_CONSTRAINTS,
            ExtensionKind::KeyUsage => oids::KEY_USAGE,
            ExtensionKind::ExtendedKeyUsage => oids::EXTENDED_KEY_USAGE,
            ExtensionKind::SubjectAltName => oids::SUBJECT_ALT_NAME,
            ExtensionKind::NameConstraints => oids::NAME_CONSTRAINTS,
            ExtensionKind::AuthorityInfoAccess => oids::AUTHORITY_INFO_ACCESS,
            ExtensionKind::CertificatePolicies => oids::CERTIFICATE_POLICIES,
            ExtensionKind::PolicyConstraints => oids::POLICY_CONSTRAINTS,
            ExtensionKind::PolicyMappings => oids::POLICY_MAPPINGS,
            ExtensionKind::InhibitAnyPolicy => oids::INHIBIT_ANY_POLICY,
            ExtensionKind::AuthorityKeyIdentifier => oids::AUTHORITY_KEY_IDENTIFIER,
            ExtensionKind::SubjectKeyIdentifier => oids::SUBJECT_KEY_IDENTIFIER,
        }
    }

    /// The kind registered for `oid`, if any
    #[must_use]
    pub fn from_oid(oid: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.oid().as_bytes() == oid)
    }

    /// The RFC 5280 name of the extension
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ExtensionKind::BasicConstraints => "basicConstraints",
            ExtensionKind::KeyUsage => "keyUsage",
            ExtensionKind::ExtendedKeyUsage => "extKeyUsage",
            ExtensionKind::SubjectAltName => "subjectAltName",
            ExtensionKind::NameConstraints => "nameConstraints",
            ExtensionKind::AuthorityInfoAccess => "authorityInfoAccess",
            ExtensionKind::CertificatePolicies => "certificatePolicies",
            ExtensionKind::PolicyConstraints => "policyConstraints",
            ExtensionKind::PolicyMappings => "policyMappings",
            ExtensionKind::InhibitAnyPolicy => "inhibitAnyPolicy",
            ExtensionKind::AuthorityKeyIdentifier => "authorityKeyIdentifier",
            ExtensionKind::SubjectKeyIdentifier => "subjectKeyIdentifier",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed value of a recognized extension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KnownExtension {
    /// basicConstraints
    BasicConstraints(BasicConstraints),
    /// keyUsage
    KeyUsage(KeyUsage),
    /// extKeyUsage purposes in encoding order
    ExtendedKeyUsage(Vec<Oid>),
    /// subjectAltName
    SubjectAltName(GeneralNames),
    /// nameConstraints
    NameConstraints(NameConstraints),
    /// authorityInfoAccess
    AuthorityInfoAccess(AuthorityInfoAccess),
    /// certificatePolicies
    CertificatePolicies(CertificatePolicies),
    /// policyConstraints
    PolicyConstraints(PolicyConstraints),
    /// policyMappings
    PolicyMappings(Vec<PolicyMapping>),
    /// inhibitAnyPolicy skip count
    InhibitAnyPolicy(u8),
    /// authorityKeyIdentifier
    AuthorityKeyIdentifier(AuthorityKeyIdentifier),
    /// subjectKeyIdentifier contents
    SubjectKeyIdentifier(Input),
}

impl KnownExtension {
    /// Decode `extension` with the decoder for `kind`
    pub fn decode(kind: ExtensionKind, extension: &ParsedExtension) -> DecodeResult<Self> {
        let value = &extension.value;
        Ok(match kind {
            ExtensionKind::BasicConstraints => {
                KnownExtension::BasicConstraints(decode_basic_constraints(value)?)
            }
            ExtensionKind::KeyUsage => KnownExtension::KeyUsage(decode_key_usage(value)?),
            ExtensionKind::ExtendedKeyUsage => {
                KnownExtension::ExtendedKeyUsage(decode_extended_key_usage(value)?)
            }
            ExtensionKind::SubjectAltName => {
                KnownExtension::SubjectAltName(decode_subject_alt_name(value)?)
            }
            ExtensionKind::NameConstraints => KnownExtension::NameConstraints(
                decode_name_constraints(value, extension.critical)?,
            ),
            ExtensionKind::AuthorityInfoAccess => {
                KnownExtension::AuthorityInfoAccess(decode_authority_info_access(value)?)
            }
            ExtensionKind::CertificatePolicies => {
                KnownExtension::CertificatePolicies(decode_certificate_policies(value)?)
            }
            ExtensionKind::PolicyConstraints => {
                KnownExtension::PolicyConstraints(decode_policy_constraints(value)?)
            }
            ExtensionKind::PolicyMappings => {
                KnownExtension::PolicyMappings(decode_policy_mappings(value)?)
            }
            ExtensionKind::InhibitAnyPolicy => {
                KnownExtension::InhibitAnyPolicy(decode_inhibit_any_policy(value)?)
            }
            ExtensionKind::AuthorityKeyIdentifier => {
                KnownExtension::AuthorityKeyIdentifier(decode_authority_key_identifier(value)?)
            }
            ExtensionKind::SubjectKeyIdentifier => {
                KnownExtension::SubjectKeyIdentifier(decode_subject_key_identifier(value)?)
            }
        })
    }

    /// Which extension this value came from
    #[must_use]
    pub fn kind(&self) -> ExtensionKind {
        match self {
            KnownExtension::BasicConstraints(_) => ExtensionKind::BasicConstraints,
            KnownExtension::KeyUsage(_) => ExtensionKind::KeyUsage,
            KnownExtension::ExtendedKeyUsage(_) => ExtensionKind::ExtendedKeyUsage,
            KnownExtension::SubjectAltName(_) => ExtensionKind::SubjectAltName,
            KnownExtension::NameConstraints(_) => ExtensionKind::NameConstraints,
            KnownExtension::AuthorityInfoAccess(_) => ExtensionKind::AuthorityInfoAccess,
            KnownExtension::CertificatePolicies(_) => ExtensionKind::CertificatePolicies,
            KnownExtension::PolicyConstraints(_) => ExtensionKind::PolicyConstraints,
            KnownExtension::PolicyMappings(_) => ExtensionKind::PolicyMappings,
            KnownExtension::InhibitAnyPolicy(_) => ExtensionKind::InhibitAnyPolicy,
            KnownExtension::AuthorityKeyIdentifier(_) => ExtensionKind::AuthorityKeyIdentifier,
            KnownExtension::SubjectKeyIdentifier(_) => ExtensionKind::SubjectKeyIdentifier,
        }
    }
}

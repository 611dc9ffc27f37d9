//! AuthorityInfoAccess (1.3.6.1.5.5.7.1.1)

use const_oid::ObjectIdentifier;

use crate::error::{DecodeError, DecodeResult};
use crate::input::{read_oid, sequence_value, Ia5Text, Input, Oid, Parser};
use crate::oids;

use super::general_names::GeneralName;

/// AccessDescription ::= SEQUENCE { accessMethod OID, accessLocation GeneralName }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessDescription {
    /// accessMethod
    pub method: Oid,
    /// accessLocation
    pub location: GeneralName,
}

/// A decoded AuthorityInfoAccess extension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorityInfoAccess {
    descriptions: Vec<AccessDescription>,
}

impl AuthorityInfoAccess {
    /// Every AccessDescription in encoding order
    #[must_use]
    pub fn descriptions(&self) -> &[AccessDescription] {
        &self.descriptions
    }

    /// URIs of id-ad-caIssuers descriptions
    pub fn ca_issuers_uris(&self) -> impl Iterator<Item = &str> {
        self.uris(oids::AD_CA_ISSUERS)
    }

    /// URIs of id-ad-ocsp descriptions
    pub fn ocsp_uris(&self) -> impl Iterator<Item = &str> {
        self.uris(oids::AD_OCSP)
    }

    fn uris(&self, method: ObjectIdentifier) -> impl Iterator<Item = &str> {
        self.descriptions
            .iter()
            .filter(move |d| d.method == method)
            .filter_map(|d| match &d.location {
                GeneralName::UniformResourceIdentifier(uri) => Some(Ia5Text::as_str(uri)),
                _ => None,
            })
    }
}

/// Decode an AuthorityInfoAccess extension value
///
/// `AuthorityInfoAccessSyntax ::= SEQUENCE SIZE (1..MAX) OF AccessDescription`
pub fn decode_authority_info_access(value: &Input) -> DecodeResult<AuthorityInfoAccess> {
    let mut parser = Parser::new(sequence_value(value)?);
    if !parser.has_more() {
        return Err(DecodeError::Empty {
            offset: parser.offset(),
            what: "AuthorityInfoAccessSyntax",
        });
    }

    let mut descriptions = Vec::new();
    while parser.has_more() {
        let mut description = parser.read_sequence()?;
        let method = read_oid(&mut description)?;
        let location_tlv = description.read_tlv()?;
        let location = GeneralName::parse(&location_tlv, &description, false)?;
        description.finish()?;
        descriptions.push(AccessDescription { method, location });
    }
    Ok(AuthorityInfoAccess { descriptions })
}

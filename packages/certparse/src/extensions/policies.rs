//! Certificate policy extensions
//!
//! CertificatePolicies (2.5.29.32), PolicyConstraints (2.5.29.36),
//! PolicyMappings (2.5.29.33) and InhibitAnyPolicy (2.5.29.54).

use std::collections::BTreeSet;

use crate::error::{DecodeError, DecodeResult};
use crate::input::{parse_u8, read_oid, sequence_value, Input, Oid, Parser, Tag, Tlv};

/// PolicyQualifierInfo ::= SEQUENCE { policyQualifierId OID, qualifier ANY }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyQualifierInfo {
    /// policyQualifierId, e.g. id-qt-cps
    pub qualifier_id: Oid,
    /// Complete qualifier TLV, undecoded
    pub qualifier: Input,
}

/// PolicyInformation ::= SEQUENCE {
///      policyIdentifier   CertPolicyId,
///      policyQualifiers   SEQUENCE SIZE (1..MAX) OF PolicyQualifierInfo OPTIONAL }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyInformation {
    /// policyIdentifier
    pub policy_oid: Oid,
    /// policyQualifiers, empty when not encoded
    pub qualifiers: Vec<PolicyQualifierInfo>,
}

/// certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificatePolicies {
    policies: Vec<PolicyInformation>,
}

impl CertificatePolicies {
    /// Each PolicyInformation in encoding order
    #[must_use]
    pub fn policies(&self) -> &[PolicyInformation] {
        &self.policies
    }

    /// The policy identifiers in encoding order
    pub fn policy_oids(&self) -> impl Iterator<Item = &Oid> {
        self.policies.iter().map(|p| &p.policy_oid)
    }

    /// True if `oid` (encoded contents) is one of the asserted policies
    #[must_use]
    pub fn contains(&self, oid: &[u8]) -> bool {
        self.policies.iter().any(|p| p.policy_oid.as_bytes() == oid)
    }
}

/// Decode a CertificatePolicies extension value
///
/// A policy OID may appear only once (RFC 5280 section 4.2.1.4).
pub fn decode_certificate_policies(value: &Input) -> DecodeResult<CertificatePolicies> {
    let mut parser = Parser::new(sequence_value(value)?);
    if !parser.has_more() {
        return Err(DecodeError::Empty {
            offset: parser.offset(),
            what: "certificatePolicies",
        });
    }

    let mut seen = BTreeSet::new();
    let mut policies = Vec::new();
    while parser.has_more() {
        let mut info = parser.read_sequence()?;
        let oid_offset = info.offset();
        let policy_oid = read_oid(&mut info)?;
        if !seen.insert(policy_oid.clone()) {
            return Err(DecodeError::invalid(
                oid_offset,
                "certificatePolicies",
                "duplicate policy identifier",
            ));
        }

        let mut qualifiers = Vec::new();
        if let Some(mut sequence) = info.read_optional_constructed(Tag::SEQUENCE)? {
            if !sequence.has_more() {
                return Err(DecodeError::Empty {
                    offset: sequence.offset(),
                    what: "policyQualifiers",
                });
            }
            while sequence.has_more() {
                let mut qualifier_info = sequence.read_sequence()?;
                let qualifier_id = read_oid(&mut qualifier_info)?;
                let Tlv { tlv: qualifier, .. } = qualifier_info.read_tlv()?;
                qualifier_info.finish()?;
                qualifiers.push(PolicyQualifierInfo {
                    qualifier_id,
                    qualifier,
                });
            }
        }
        info.finish()?;

        policies.push(PolicyInformation {
            policy_oid,
            qualifiers,
        });
    }
    Ok(CertificatePolicies { policies })
}

/// PolicyConstraints ::= SEQUENCE {
///      requireExplicitPolicy   [0] SkipCerts OPTIONAL,
///      inhibitPolicyMapping    [1] SkipCerts OPTIONAL }
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PolicyConstraints {
    /// requireExplicitPolicy
    pub require_explicit_policy: Option<u8>,
    /// inhibitPolicyMapping
    pub inhibit_policy_mapping: Option<u8>,
}

/// Decode a PolicyConstraints extension value
///
/// At least one of the two fields must be present.
pub fn decode_policy_constraints(value: &Input) -> DecodeResult<PolicyConstraints> {
    let mut parser = Parser::new(sequence_value(value)?);
    let start = parser.offset();

    let require_explicit_policy = read_skip_certs(&mut parser, 0)?;
    let inhibit_policy_mapping = read_skip_certs(&mut parser, 1)?;
    parser.finish()?;

    if require_explicit_policy.is_none() && inhibit_policy_mapping.is_none() {
        return Err(DecodeError::invalid(
            start,
            "PolicyConstraints",
            "neither requireExplicitPolicy nor inhibitPolicyMapping is present",
        ));
    }
    Ok(PolicyConstraints {
        require_explicit_policy,
        inhibit_policy_mapping,
    })
}

/// SkipCerts ::= INTEGER (0..MAX), IMPLICIT `[number]`
fn read_skip_certs(parser: &mut Parser, number: u8) -> DecodeResult<Option<u8>> {
    match parser.read_optional_tag(Tag::context_specific(number))? {
        Some(value) => Ok(Some(parse_u8(&value)?)),
        None => Ok(None),
    }
}

/// One issuerDomainPolicy to subjectDomainPolicy mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyMapping {
    /// issuerDomainPolicy
    pub issuer_domain_policy: Oid,
    /// subjectDomainPolicy
    pub subject_domain_policy: Oid,
}

/// Decode a PolicyMappings extension value
///
/// `PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE { issuerDomainPolicy, subjectDomainPolicy }`
pub fn decode_policy_mappings(value: &Input) -> DecodeResult<Vec<PolicyMapping>> {
    let mut parser = Parser::new(sequence_value(value)?);
    if !parser.has_more() {
        return Err(DecodeError::Empty {
            offset: parser.offset(),
            what: "PolicyMappings",
        });
    }

    let mut mappings = Vec::new();
    while parser.has_more() {
        let mut mapping = parser.read_sequence()?;
        let issuer_domain_policy = read_oid(&mut mapping)?;
        let subject_domain_policy = read_oid(&mut mapping)?;
        mapping.finish()?;
        mappings.push(PolicyMapping {
            issuer_domain_policy,
            subject_domain_policy,
        });
    }
    Ok(mappings)
}

/// Decode an InhibitAnyPolicy extension value (`SkipCerts ::= INTEGER (0..MAX)`)
pub fn decode_inhibit_any_policy(value: &Input) -> DecodeResult<u8> {
    let mut parser = Parser::new(value.clone());
    let integer = parser.read_tag(Tag::INTEGER)?;
    parser.finish()?;
    parse_u8(&integer)
}

//! The parsed certificate aggregate and its factory

use std::collections::BTreeMap;
use std::sync::Arc;

use certparse_common::{CertErrors, Diagnostic, LoggingTransformer};

use crate::error::{CertError, Result};
use crate::extensions::{
    parse_extensions, AuthorityInfoAccess, AuthorityKeyIdentifier, BasicConstraints,
    CertificatePolicies, ExtensionKind, ExtensionsMap, GeneralNames, KeyUsage, KnownExtension,
    NameConstraints, ParsedExtension, PolicyConstraints, PolicyMapping,
};
use crate::input::{sequence_value, BitString, CertBuffer, Input, Oid};
use crate::options::ParseCertificateOptions;

use super::fields::{parse_certificate, parse_tbs_certificate, ParsedTbsCertificate};
use super::name::normalize_name;
use super::signature::SignatureAlgorithm;

/// A chain of shared parsed certificates
pub type ParsedCertificateList = Vec<Arc<ParsedCertificate>>;

/// An X.509 certificate parsed down to its standard fields and extensions
///
/// Holding a `ParsedCertificate` means the outer structure, the
/// TBSCertificate, the signature algorithm and every recognized extension
/// decoded successfully. It does not mean the certificate is trusted, valid
/// at any particular time, or correctly signed.
///
/// All views ([`Input`]) share the backing buffer; it is released when the
/// last view and the last `Arc` are dropped.
#[derive(Debug)]
pub struct ParsedCertificate {
    cert: Input,
    tbs_certificate_tlv: Input,
    signature_algorithm_tlv: Input,
    signature_value: BitString,
    tbs: ParsedTbsCertificate,
    signature_algorithm: SignatureAlgorithm,
    normalized_subject: Option<Vec<u8>>,
    normalized_issuer: Option<Vec<u8>>,
    known: BTreeMap<ExtensionKind, KnownExtension>,
    extensions: ExtensionsMap,
}

/// Generate the typed accessor and `has_*` helper for one extension kind
macro_rules! extension_accessors {
    ($($(#[$doc:meta])* $accessor:ident, $has:ident => $kind:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $accessor(&self) -> Option<&$ty> {
                match self.known.get(&ExtensionKind::$kind)? {
                    KnownExtension::$kind(value) => Some(value),
                    _ => None,
                }
            }

            #[doc = concat!("True if [`Self::", stringify!($accessor), "`] is present")]
            #[must_use]
            pub fn $has(&self) -> bool {
                self.$accessor().is_some()
            }
        )*
    };
}

impl ParsedCertificate {
    /// Parse a DER-encoded certificate, copying `data` into owned storage
    ///
    /// On failure nothing is returned but the error; the error and any
    /// warnings are also appended to `errors` when a sink is given. On
    /// success, non-fatal warnings are appended to `errors`.
    pub fn create(
        data: &[u8],
        options: &ParseCertificateOptions,
        errors: Option<&mut CertErrors>,
    ) -> Result<Arc<Self>> {
        Self::create_from_buffer(CertBuffer::copy_from_slice(data), options, errors)
    }

    /// Parse a DER-encoded certificate from a buffer the caller hands over
    pub fn create_from_buffer(
        buffer: CertBuffer,
        options: &ParseCertificateOptions,
        errors: Option<&mut CertErrors>,
    ) -> Result<Arc<Self>> {
        let mut diagnostics = CertErrors::new();
        let result = Self::parse(&buffer, options, &mut diagnostics);

        match &result {
            Ok(cert) => {
                LoggingTransformer::log_certificate_parsed(buffer.len(), cert.extensions.len());
            }
            Err(err) => {
                let mut diagnostic = Diagnostic::error(err.to_string()).with_offset(err.offset());
                if let Some(oid) = err.oid() {
                    diagnostic = diagnostic.with_oid(oid);
                }
                diagnostics.add(diagnostic);
                LoggingTransformer::log_certificate_rejected(buffer.len(), err);
            }
        }
        diagnostics.iter().for_each(LoggingTransformer::log_diagnostic);

        if let Some(sink) = errors {
            sink.append(&mut diagnostics);
        }
        result.map(Arc::new)
    }

    /// Parse a copy of `data` and push it onto `chain`
    ///
    /// Returns `true` if the certificate was parsed and added. On failure
    /// `chain` is left exactly as it was.
    pub fn create_and_add_to_vector(
        data: &[u8],
        options: &ParseCertificateOptions,
        chain: &mut ParsedCertificateList,
        errors: Option<&mut CertErrors>,
    ) -> bool {
        match Self::create(data, options, errors) {
            Ok(cert) => {
                chain.push(cert);
                true
            }
            Err(_) => false,
        }
    }

    fn parse(
        buffer: &CertBuffer,
        options: &ParseCertificateOptions,
        errors: &mut CertErrors,
    ) -> Result<Self> {
        let cert = buffer.input();
        let fields = parse_certificate(&cert).map_err(CertError::malformed("certificate"))?;
        let tbs = parse_tbs_certificate(&fields.tbs_certificate_tlv, options, errors)
            .map_err(CertError::malformed("tbsCertificate"))?;
        let signature_algorithm = SignatureAlgorithm::parse(&fields.signature_algorithm_tlv)
            .map_err(CertError::malformed("signatureAlgorithm"))?;

        let normalized_subject = normalize(&tbs.subject_tlv, "subject", errors);
        let normalized_issuer = normalize(&tbs.issuer_tlv, "issuer", errors);

        let extensions = match &tbs.extensions_tlv {
            Some(tlv) => parse_extensions(tlv)?,
            None => ExtensionsMap::new(),
        };

        let mut known = BTreeMap::new();
        for kind in ExtensionKind::ALL {
            let Some(extension) = extensions.get(kind.oid().as_bytes()) else {
                continue;
            };
            let value =
                KnownExtension::decode(kind, extension).map_err(|source| CertError::Extension {
                    kind,
                    oid: extension.oid.clone(),
                    source,
                })?;
            tracing::trace!(extension = %kind, critical = extension.critical, "decoded extension");
            known.insert(kind, value);
        }

        // RFC 5280 section 4.1.2.6: a subject carried only in subjectAltName
        // needs an empty subject and a critical extension
        if let Some(san) = extensions.get(ExtensionKind::SubjectAltName.oid().as_bytes()) {
            if !san.critical {
                let subject = sequence_value(&tbs.subject_tlv)
                    .map_err(CertError::malformed("subject"))?;
                if subject.is_empty() {
                    return Err(CertError::SubjectAltNameNotCritical {
                        offset: san.value.offset(),
                    });
                }
            }
        }

        Ok(Self {
            cert,
            tbs_certificate_tlv: fields.tbs_certificate_tlv,
            signature_algorithm_tlv: fields.signature_algorithm_tlv,
            signature_value: fields.signature_value,
            tbs,
            signature_algorithm,
            normalized_subject,
            normalized_issuer,
            known,
            extensions,
        })
    }

    /// The complete DER encoding
    #[must_use]
    pub fn der_cert(&self) -> &Input {
        &self.cert
    }

    /// The complete TBSCertificate TLV, the bytes the signature covers
    #[must_use]
    pub fn tbs_certificate_tlv(&self) -> &Input {
        &self.tbs_certificate_tlv
    }

    /// The complete outer signatureAlgorithm TLV
    #[must_use]
    pub fn signature_algorithm_tlv(&self) -> &Input {
        &self.signature_algorithm_tlv
    }

    /// The signature value
    #[must_use]
    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }

    /// The decoded TBSCertificate fields
    #[must_use]
    pub fn tbs(&self) -> &ParsedTbsCertificate {
        &self.tbs
    }

    /// The outer signatureAlgorithm (not the one inside the TBSCertificate)
    #[must_use]
    pub fn signature_algorithm(&self) -> &SignatureAlgorithm {
        &self.signature_algorithm
    }

    /// The raw subject, outer SEQUENCE included
    #[must_use]
    pub fn subject_tlv(&self) -> &Input {
        &self.tbs.subject_tlv
    }

    /// The raw issuer, outer SEQUENCE included
    #[must_use]
    pub fn issuer_tlv(&self) -> &Input {
        &self.tbs.issuer_tlv
    }

    /// The normalized subject, outer SEQUENCE excluded
    ///
    /// `None` if the subject could not be normalized; a warning was recorded.
    #[must_use]
    pub fn normalized_subject(&self) -> Option<&[u8]> {
        self.normalized_subject.as_deref()
    }

    /// The normalized issuer, outer SEQUENCE excluded
    #[must_use]
    pub fn normalized_issuer(&self) -> Option<&[u8]> {
        self.normalized_issuer.as_deref()
    }

    extension_accessors! {
        /// BasicConstraints, if present
        basic_constraints, has_basic_constraints => BasicConstraints: BasicConstraints;
        /// KeyUsage, if present
        key_usage, has_key_usage => KeyUsage: KeyUsage;
        /// ExtendedKeyUsage purposes in encoding order, if present
        extended_key_usage, has_extended_key_usage => ExtendedKeyUsage: Vec<Oid>;
        /// SubjectAltName, if present
        subject_alt_names, has_subject_alt_names => SubjectAltName: GeneralNames;
        /// NameConstraints, if present
        name_constraints, has_name_constraints => NameConstraints: NameConstraints;
        /// AuthorityInfoAccess, if present
        authority_info_access, has_authority_info_access => AuthorityInfoAccess: AuthorityInfoAccess;
        /// CertificatePolicies, if present
        certificate_policies, has_certificate_policies => CertificatePolicies: CertificatePolicies;
        /// PolicyConstraints, if present
        policy_constraints, has_policy_constraints => PolicyConstraints: PolicyConstraints;
        /// PolicyMappings, if present
        policy_mappings, has_policy_mappings => PolicyMappings: Vec<PolicyMapping>;
        /// InhibitAnyPolicy skip count, if present
        inhibit_any_policy, has_inhibit_any_policy => InhibitAnyPolicy: u8;
        /// AuthorityKeyIdentifier, if present
        authority_key_identifier, has_authority_key_identifier => AuthorityKeyIdentifier: AuthorityKeyIdentifier;
        /// SubjectKeyIdentifier contents, if present
        subject_key_identifier, has_subject_key_identifier => SubjectKeyIdentifier: Input;
    }

    /// Policy identifiers from CertificatePolicies, if the extension is present
    #[must_use]
    pub fn policy_oids(&self) -> Option<Vec<Oid>> {
        self.certificate_policies()
            .map(|policies| policies.policy_oids().cloned().collect())
    }

    /// True if the certificate has a CertificatePolicies extension
    #[must_use]
    pub fn has_policy_oids(&self) -> bool {
        self.has_certificate_policies()
    }

    /// caIssuers URIs from AuthorityInfoAccess; empty if absent
    pub fn ca_issuers_uris(&self) -> impl Iterator<Item = &str> {
        self.authority_info_access()
            .into_iter()
            .flat_map(AuthorityInfoAccess::ca_issuers_uris)
    }

    /// OCSP URIs from AuthorityInfoAccess; empty if absent
    pub fn ocsp_uris(&self) -> impl Iterator<Item = &str> {
        self.authority_info_access()
            .into_iter()
            .flat_map(AuthorityInfoAccess::ocsp_uris)
    }

    /// The raw SubjectAltName extension entry
    #[must_use]
    pub fn subject_alt_names_extension(&self) -> Option<&ParsedExtension> {
        self.extension(ExtensionKind::SubjectAltName.oid().as_bytes())
    }

    /// The raw AuthorityInfoAccess extension entry
    #[must_use]
    pub fn authority_info_access_extension(&self) -> Option<&ParsedExtension> {
        self.extension(ExtensionKind::AuthorityInfoAccess.oid().as_bytes())
    }

    /// Typed value of a recognized extension, by kind
    #[must_use]
    pub fn known_extension(&self, kind: ExtensionKind) -> Option<&KnownExtension> {
        self.known.get(&kind)
    }

    /// Look up any extension by its encoded OID contents, recognized or not
    ///
    /// e.g. `cert.extension(oids::KEY_USAGE.as_bytes())`
    #[must_use]
    pub fn extension(&self, oid: &[u8]) -> Option<&ParsedExtension> {
        self.extensions.get(oid)
    }

    /// Every extension, keyed by OID
    #[must_use]
    pub fn extensions(&self) -> &ExtensionsMap {
        &self.extensions
    }

    /// Critical extensions this crate does not decode
    ///
    /// Parsing does not reject these; a path validator usually must.
    pub fn unhandled_critical_extensions(&self) -> impl Iterator<Item = &ParsedExtension> {
        self.extensions
            .values()
            .filter(|ext| ext.critical && ExtensionKind::from_oid(ext.oid.as_bytes()).is_none())
    }
}

/// Normalize a Name TLV, recording a warning instead of failing
fn normalize(name_tlv: &Input, field: &'static str, errors: &mut CertErrors) -> Option<Vec<u8>> {
    let normalized = sequence_value(name_tlv)
        .map_err(Into::into)
        .and_then(|value| normalize_name(&value));
    match normalized {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::warn!(field, error = %err, "name normalization failed");
            errors.add(
                Diagnostic::warning(format!("failed normalizing {field}: {err}"))
                    .with_offset(name_tlv.offset()),
            );
            None
        }
    }
}

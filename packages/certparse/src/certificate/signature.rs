//! Certificate signature algorithm identification
//!
//! Decodes the outer `signatureAlgorithm` AlgorithmIdentifier into one of the
//! supported schemes. Unknown OIDs and parameters that do not match the
//! scheme are errors.

use std::fmt;

use crate::error::{DecodeError, DecodeResult};
use crate::input::{parse_u32, AlgorithmIdentifier, Input, Parser, Tag};
use crate::oids;

/// Hash function used by a signature scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-1
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// Output length in bytes
    #[must_use]
    pub fn output_len(self) -> u32 {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    fn from_hash_identifier(id: &AlgorithmIdentifier, offset: usize) -> DecodeResult<Self> {
        if !id.parameters_absent_or_null() {
            return Err(DecodeError::invalid(
                offset,
                "hash algorithm",
                "parameters must be NULL or absent",
            ));
        }
        match id.oid.to_object_identifier() {
            Some(oids::SHA1) => Ok(DigestAlgorithm::Sha1),
            Some(oids::SHA256) => Ok(DigestAlgorithm::Sha256),
            Some(oids::SHA384) => Ok(DigestAlgorithm::Sha384),
            Some(oids::SHA512) => Ok(DigestAlgorithm::Sha512),
            _ => Err(DecodeError::UnsupportedAlgorithm {
                offset,
                oid: id.oid.clone(),
            }),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha1 => write!(f, "SHA-1"),
            DigestAlgorithm::Sha256 => write!(f, "SHA-256"),
            DigestAlgorithm::Sha384 => write!(f, "SHA-384"),
            DigestAlgorithm::Sha512 => write!(f, "SHA-512"),
        }
    }
}

/// Signature scheme family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// RSASSA-PKCS1-v1_5
    RsaPkcs1,
    /// RSASSA-PSS
    RsaPss,
    /// ECDSA
    Ecdsa,
    /// Ed25519
    Ed25519,
}

/// RSASSA-PSS parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RsaPssParameters {
    /// Hash used by MGF1 (always equal to the message digest)
    pub mgf1_digest: DigestAlgorithm,
    /// Salt length in bytes
    pub salt_length: u32,
}

/// A decoded signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureAlgorithm {
    scheme: SignatureScheme,
    digest: Option<DigestAlgorithm>,
    pss: Option<RsaPssParameters>,
}

impl SignatureAlgorithm {
    /// Decode a complete AlgorithmIdentifier TLV
    pub fn parse(tlv: &Input) -> DecodeResult<Self> {
        let offset = tlv.offset();
        let mut parser = Parser::new(tlv.clone());
        let id = AlgorithmIdentifier::read(&mut parser)?;
        parser.finish()?;

        let rsa_pkcs1 = |digest| -> DecodeResult<Self> {
            if !id.parameters_absent_or_null() {
                return Err(DecodeError::invalid(
                    offset,
                    "RSA PKCS#1 signature algorithm",
                    "parameters must be NULL or absent",
                ));
            }
            Ok(Self::new(SignatureScheme::RsaPkcs1, Some(digest)))
        };
        let no_params = |scheme, digest| -> DecodeResult<Self> {
            if id.parameters.is_some() {
                return Err(DecodeError::invalid(
                    offset,
                    "signature algorithm",
                    "parameters must be absent",
                ));
            }
            Ok(Self::new(scheme, digest))
        };

        match id.oid.to_object_identifier() {
            Some(oids::SHA1_WITH_RSA_ENCRYPTION | oids::SHA1_WITH_RSA_SIGNATURE_OIW) => {
                rsa_pkcs1(DigestAlgorithm::Sha1)
            }
            Some(oids::SHA256_WITH_RSA_ENCRYPTION) => rsa_pkcs1(DigestAlgorithm::Sha256),
            Some(oids::SHA384_WITH_RSA_ENCRYPTION) => rsa_pkcs1(DigestAlgorithm::Sha384),
            Some(oids::SHA512_WITH_RSA_ENCRYPTION) => rsa_pkcs1(DigestAlgorithm::Sha512),
            Some(oids::ECDSA_WITH_SHA1) => no_params(SignatureScheme::Ecdsa, Some(DigestAlgorithm::Sha1)),
            Some(oids::ECDSA_WITH_SHA256) => {
                no_params(SignatureScheme::Ecdsa, Some(DigestAlgorithm::Sha256))
            }
            Some(oids::ECDSA_WITH_SHA384) => {
                no_params(SignatureScheme::Ecdsa, Some(DigestAlgorithm::Sha384))
            }
            Some(oids::ECDSA_WITH_SHA512) => {
                no_params(SignatureScheme::Ecdsa, Some(DigestAlgorithm::Sha512))
            }
            Some(oids::ED25519) => no_params(SignatureScheme::Ed25519, None),
            Some(oids::RSASSA_PSS) => match &id.parameters {
                Some(params) if params.tag == Tag::SEQUENCE => parse_pss(params.value.clone()),
                _ => Err(DecodeError::invalid(
                    offset,
                    "RSASSA-PSS",
                    "parameters must be a SEQUENCE",
                )),
            },
            _ => Err(DecodeError::UnsupportedAlgorithm {
                offset,
                oid: id.oid.clone(),
            }),
        }
    }

    fn new(scheme: SignatureScheme, digest: Option<DigestAlgorithm>) -> Self {
        Self {
            scheme,
            digest,
            pss: None,
        }
    }

    /// Signature scheme family
    #[must_use]
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    /// Message digest, `None` for schemes that hash internally (Ed25519)
    #[must_use]
    pub fn digest(&self) -> Option<DigestAlgorithm> {
        self.digest
    }

    /// PSS parameters, present only for [`SignatureScheme::RsaPss`]
    #[must_use]
    pub fn pss_parameters(&self) -> Option<&RsaPssParameters> {
        self.pss.as_ref()
    }
}

/// RSASSA-PSS-params ::= SEQUENCE {
///   hashAlgorithm      [0] HashAlgorithm DEFAULT sha1,
///   maskGenAlgorithm   [1] MaskGenAlgorithm DEFAULT mgf1SHA1,
///   saltLength         [2] INTEGER DEFAULT 20,
///   trailerField       [3] TrailerField DEFAULT trailerFieldBC }
///
/// Only SHA-256/384/512 with a matching MGF1 hash and a salt as long as the
/// digest output are accepted.
fn parse_pss(params: Input) -> DecodeResult<SignatureAlgorithm> {
    let offset = params.offset();
    let mut parser = Parser::new(params);

    let digest = match parser.read_optional_constructed(Tag::context_specific_constructed(0))? {
        Some(mut inner) => {
            let hash_offset = inner.offset();
            let id = AlgorithmIdentifier::read(&mut inner)?;
            inner.finish()?;
            DigestAlgorithm::from_hash_identifier(&id, hash_offset)?
        }
        None => DigestAlgorithm::Sha1,
    };

    let mgf1_digest =
        match parser.read_optional_constructed(Tag::context_specific_constructed(1))? {
            Some(mut inner) => {
                let mgf_offset = inner.offset();
                let id = AlgorithmIdentifier::read(&mut inner)?;
                inner.finish()?;
                if id.oid != oids::MGF1 {
                    return Err(DecodeError::UnsupportedAlgorithm {
                        offset: mgf_offset,
                        oid: id.oid,
                    });
                }
                let hash_params = match id.parameters {
                    Some(tlv) if tlv.tag == Tag::SEQUENCE => tlv.tlv,
                    _ => {
                        return Err(DecodeError::invalid(
                            mgf_offset,
                            "MGF1",
                            "missing hash algorithm",
                        ))
                    }
                };
                let mut hash_parser = Parser::new(hash_params);
                let hash_id = AlgorithmIdentifier::read(&mut hash_parser)?;
                hash_parser.finish()?;
                DigestAlgorithm::from_hash_identifier(&hash_id, mgf_offset)?
            }
            None => DigestAlgorithm::Sha1,
        };

    let salt_length = match parser.read_optional_constructed(Tag::context_specific_constructed(2))? {
        Some(mut inner) => {
            let value = inner.read_tag(Tag::INTEGER)?;
            inner.finish()?;
            parse_u32(&value)?
        }
        None => 20,
    };

    if let Some(mut inner) = parser.read_optional_constructed(Tag::context_specific_constructed(3))? {
        let value = inner.read_tag(Tag::INTEGER)?;
        inner.finish()?;
        if parse_u32(&value)? != 1 {
            return Err(DecodeError::invalid(
                value.offset(),
                "RSASSA-PSS",
                "trailerField must be 1",
            ));
        }
    }
    parser.finish()?;

    if !matches!(
        digest,
        DigestAlgorithm::Sha256 | DigestAlgorithm::Sha384 | DigestAlgorithm::Sha512
    ) {
        return Err(DecodeError::invalid(offset, "RSASSA-PSS", "unsupported hash"));
    }
    if mgf1_digest != digest {
        return Err(DecodeError::invalid(
            offset,
            "RSASSA-PSS",
            "MGF1 hash differs from message hash",
        ));
    }
    if salt_length != digest.output_len() {
        return Err(DecodeError::invalid(
            offset,
            "RSASSA-PSS",
            "salt length must equal the digest length",
        ));
    }

    Ok(SignatureAlgorithm {
        scheme: SignatureScheme::RsaPss,
        digest: Some(digest),
        pss: Some(RsaPssParameters {
            mgf1_digest,
            salt_length,
        }),
    })
}

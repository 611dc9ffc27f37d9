//! Certificate-level decoding
//!
//! Splits a certificate into its fields, identifies its signature algorithm,
//! normalizes names, and assembles the immutable [`ParsedCertificate`].

mod fields;
mod name;
mod parsed;
mod signature;

pub use fields::{
    parse_certificate, parse_tbs_certificate, CertificateFields, CertificateVersion,
    ParsedTbsCertificate,
};
pub use name::{normalize_name, NormalizeError};
pub use parsed::{ParsedCertificate, ParsedCertificateList};
pub use signature::{DigestAlgorithm, RsaPssParameters, SignatureAlgorithm, SignatureScheme};

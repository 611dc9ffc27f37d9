#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::uninlined_format_args)]

//! Zero-copy structural parser for DER-encoded X.509 certificates
//!
//! [`ParsedCertificate::create`] decodes a certificate into an immutable,
//! `Arc`-shared aggregate: raw views of the fields a signature verifier
//! needs, the decoded TBSCertificate, the outer signature algorithm,
//! normalized subject and issuer names, and typed values for the twelve
//! standard extensions. No signature, time or policy validation happens here.
//!
//! ```no_run
//! use certparse::{ParseCertificateOptions, ParsedCertificate};
//! use certparse_common::CertErrors;
//!
//! # fn demo(der: &[u8]) {
//! let mut errors = CertErrors::new();
//! match ParsedCertificate::create(der, &ParseCertificateOptions::default(), Some(&mut errors)) {
//!     Ok(cert) => {
//!         if let Some(bc) = cert.basic_constraints() {
//!             println!("CA: {}", bc.is_ca);
//!         }
//!     }
//!     Err(err) => eprintln!("rejected: {err}\n{errors}"),
//! }
//! # }
//! ```
//!
//! Each extension decoder is also usable on its own, see [`extensions`].

pub mod certificate;
pub mod error;
pub mod extensions;
pub mod input;
pub mod oids;
pub mod options;

pub use certificate::{
    normalize_name, CertificateVersion, DigestAlgorithm, ParsedCertificate,
    ParsedCertificateList, ParsedTbsCertificate, SignatureAlgorithm, SignatureScheme,
};
pub use error::{CertError, DecodeError, DecodeResult, Result};
pub use extensions::{ExtensionKind, ExtensionsMap, KnownExtension, ParsedExtension};
pub use input::{BitString, CertBuffer, Input, Oid, MAX_NESTING_DEPTH};
pub use options::ParseCertificateOptions;

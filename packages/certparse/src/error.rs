//! Error types for certificate parsing
//!
//! [`DecodeError`] describes a grammar violation inside one DER structure and
//! always carries the absolute byte offset where it was detected.
//! [`CertError`] is the fatal, certificate-level error returned by the
//! factory; it wraps a `DecodeError` with the field or extension it came from.

use thiserror::Error;

use crate::extensions::ExtensionKind;
use crate::input::{Oid, Tag};

/// Grammar violation while decoding a DER structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended inside an element
    #[error("unexpected end of input at offset {offset}")]
    Truncated {
        /// Where the cut-off element starts
        offset: usize,
    },

    /// Indefinite, non-minimal or oversized length
    #[error("invalid DER length at offset {offset}: {source}")]
    Length {
        /// Where the element starts
        offset: usize,
        /// Length decoding failure
        source: der::Error,
    },

    /// Tag numbers of 31 and above
    #[error("high-tag-number form is not supported at offset {offset}")]
    HighTagNumber {
        /// Where the element starts
        offset: usize,
    },

    /// A required element had the wrong tag
    #[error("expected tag {expected}, found {actual} at offset {offset}")]
    UnexpectedTag {
        /// Where the element starts
        offset: usize,
        /// Tag the grammar requires
        expected: Tag,
        /// Tag found
        actual: Tag,
    },

    /// A required element was not there
    #[error("missing required element with tag {expected} at offset {offset}")]
    MissingElement {
        /// Where the element was expected
        offset: usize,
        /// Tag the grammar requires
        expected: Tag,
    },

    /// Bytes left over after the last expected element
    #[error("unconsumed trailing data at offset {offset}")]
    TrailingData {
        /// Start of the leftover bytes
        offset: usize,
    },

    /// Constructed elements nested past [`crate::MAX_NESTING_DEPTH`]
    #[error("nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep {
        /// Where the element that exceeded the cap starts
        offset: usize,
        /// The cap
        limit: usize,
    },

    /// A value the `der` crate rejected
    #[error("invalid {tag} value at offset {offset}: {source}")]
    Der {
        /// Where the value starts
        offset: usize,
        /// Tag of the value
        tag: Tag,
        /// Decoding failure
        source: der::Error,
    },

    /// A value that breaks a rule of its type
    #[error("invalid {what} at offset {offset}: {reason}")]
    InvalidValue {
        /// Where the value starts
        offset: usize,
        /// What was being decoded
        what: &'static str,
        /// The rule that was broken
        reason: &'static str,
    },

    /// An empty value or SEQUENCE OF where at least one entry is required
    #[error("{what} must not be empty at offset {offset}")]
    Empty {
        /// Where the value starts
        offset: usize,
        /// What was being decoded
        what: &'static str,
    },

    /// An algorithm identifier this crate does not support
    #[error("unsupported algorithm {oid} at offset {offset}")]
    UnsupportedAlgorithm {
        /// Where the AlgorithmIdentifier starts
        offset: usize,
        /// The algorithm OID
        oid: Oid,
    },
}

impl DecodeError {
    /// Absolute byte offset where the problem was detected
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::Truncated { offset }
            | DecodeError::Length { offset, .. }
            | DecodeError::HighTagNumber { offset }
            | DecodeError::UnexpectedTag { offset, .. }
            | DecodeError::MissingElement { offset, .. }
            | DecodeError::TrailingData { offset }
            | DecodeError::NestingTooDeep { offset, .. }
            | DecodeError::Der { offset, .. }
            | DecodeError::InvalidValue { offset, .. }
            | DecodeError::Empty { offset, .. }
            | DecodeError::UnsupportedAlgorithm { offset, .. } => *offset,
        }
    }

    pub(crate) fn invalid(offset: usize, what: &'static str, reason: &'static str) -> Self {
        DecodeError::InvalidValue {
            offset,
            what,
            reason,
        }
    }
}

/// Fatal certificate-level error; no aggregate is produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertError {
    /// A certificate field failed to decode
    #[error("failed parsing {field}: {source}")]
    Malformed {
        /// ASN.1 name of the field
        field: &'static str,
        /// Underlying failure
        source: DecodeError,
    },

    /// Two extensions share an OID
    #[error("duplicate extension {oid} at offset {offset}")]
    DuplicateExtension {
        /// The repeated OID
        oid: Oid,
        /// Where the second occurrence starts
        offset: usize,
    },

    /// A recognized extension failed to decode
    #[error("failed parsing {kind} extension {oid}: {source}")]
    Extension {
        /// Which extension
        kind: ExtensionKind,
        /// Its OID
        oid: Oid,
        /// Underlying failure
        source: DecodeError,
    },

    /// Non-critical subjectAltName alongside an empty subject
    #[error("subjectAltName must be critical when the subject is empty (offset {offset})")]
    SubjectAltNameNotCritical {
        /// Where the extension value starts
        offset: usize,
    },
}

impl CertError {
    pub(crate) fn malformed(field: &'static str) -> impl FnOnce(DecodeError) -> CertError {
        move |source| CertError::Malformed { field, source }
    }

    /// OID of the extension involved, if the error concerns one
    #[must_use]
    pub fn oid(&self) -> Option<Oid> {
        match self {
            CertError::DuplicateExtension { oid, .. } | CertError::Extension { oid, .. } => {
                Some(oid.clone())
            }
            CertError::SubjectAltNameNotCritical { .. } => {
                Some(ExtensionKind::SubjectAltName.oid().into())
            }
            CertError::Malformed { .. } => None,
        }
    }

    /// Absolute byte offset where the problem was detected
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            CertError::Malformed { source, .. } | CertError::Extension { source, .. } => {
                source.offset()
            }
            CertError::DuplicateExtension { offset, .. }
            | CertError::SubjectAltNameNotCritical { offset } => *offset,
        }
    }
}

/// Result type for DER decoding
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Result type for certificate parsing
pub type Result<T> = std::result::Result<T, CertError>;

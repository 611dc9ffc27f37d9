//! Backing buffer and zero-copy views
//!
//! [`CertBuffer`] owns the certificate bytes behind a reference count.
//! [`Input`] is a view into that storage that remembers its absolute offset,
//! so every decoded field can point back to where it came from without
//! copying. Views keep the storage alive; nothing can mutate it.

use bytes::Bytes;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// Owned, immutable storage for one DER-encoded certificate
#[derive(Clone, PartialEq, Eq)]
pub struct CertBuffer {
    bytes: Bytes,
}

impl CertBuffer {
    /// Copy caller-controlled memory into owned storage
    #[must_use]
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// The raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the buffer holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A view over the whole buffer, starting at offset 0
    #[must_use]
    pub fn input(&self) -> Input {
        Input {
            bytes: self.bytes.clone(),
            offset: 0,
        }
    }
}

impl From<Vec<u8>> for CertBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }
}

impl From<&'static [u8]> for CertBuffer {
    fn from(data: &'static [u8]) -> Self {
        Self {
            bytes: Bytes::from_static(data),
        }
    }
}

impl fmt::Debug for CertBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A view into a [`CertBuffer`]
///
/// Equality, ordering and hashing are by content only; two views with the
/// same bytes at different offsets compare equal.
#[derive(Clone)]
pub struct Input {
    bytes: Bytes,
    offset: usize,
}

impl Input {
    /// Wrap standalone bytes as a view starting at offset 0
    ///
    /// Intended for decoding a detached value, e.g. a single extension value
    /// handed to one of the `decode_*` functions.
    #[must_use]
    pub fn from_static(data: &'static [u8]) -> Self {
        Self {
            bytes: Bytes::from_static(data),
            offset: 0,
        }
    }

    /// Copy standalone bytes into a fresh view starting at offset 0
    #[must_use]
    pub fn copy_from_slice(data: &[u8]) -> Self {
        CertBuffer::copy_from_slice(data).input()
    }

    /// The viewed bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Absolute offset of the first byte within the backing buffer
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the view is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Sub-view over `range`, relative to this view
    ///
    /// Callers only pass ranges the TLV reader has already bounds-checked;
    /// an out-of-range request is an internal invariant violation and panics
    /// inside `Bytes::slice`.
    pub(crate) fn slice(&self, range: Range<usize>) -> Input {
        Input {
            offset: self.offset + range.start,
            bytes: self.bytes.slice(range),
        }
    }
}

impl AsRef<[u8]> for Input {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Borrow<[u8]> for Input {
    fn borrow(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Input {}

impl PartialEq<[u8]> for Input {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialOrd for Input {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Input {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for Input {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Input {{ offset: {}, len: {}, bytes: {} }}",
            self.offset,
            self.bytes.len(),
            hex::encode(&self.bytes)
        )
    }
}

//! Diagnostics sink for certificate parsing
//!
//! Parsers append one [`Diagnostic`] per finding. Fatal findings use
//! [`Severity::Error`]; findings that do not block a successful parse use
//! [`Severity::Warning`]. Each entry can name the offending OID and the byte
//! offset into the certificate where the problem was found.

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recorded, but the parse still succeeded
    Warning,
    /// The parse failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single parser finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the finding
    pub severity: Severity,
    /// Human readable description
    pub message: String,
    /// Dotted OID of the extension or algorithm involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    /// Absolute byte offset into the certificate, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl Diagnostic {
    /// Create an error diagnostic
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            oid: None,
            offset: None,
        }
    }

    /// Create a warning diagnostic
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            oid: None,
            offset: None,
        }
    }

    /// Attach the OID this diagnostic refers to
    #[must_use]
    pub fn with_oid(mut self, oid: impl fmt::Display) -> Self {
        self.oid = Some(oid.to_string());
        self
    }

    /// Attach an absolute byte offset
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(oid) = &self.oid {
            write!(f, " (oid: {oid})")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (offset: {offset})")?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics produced while parsing one certificate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertErrors {
    entries: Vec<Diagnostic>,
}

impl CertErrors {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Append an error with a message
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::error(message));
    }

    /// Append a warning with a message
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::warning(message));
    }

    /// Move every diagnostic of `other` into this sink, preserving order
    pub fn append(&mut self, other: &mut CertErrors) {
        self.entries.append(&mut other.entries);
    }

    /// True if any entry has [`Severity::Error`]
    #[must_use]
    pub fn contains_error(&self) -> bool {
        self.contains_severity(Severity::Error)
    }

    /// True if any entry has the given severity
    #[must_use]
    pub fn contains_severity(&self, severity: Severity) -> bool {
        self.entries.iter().any(|d| d.severity == severity)
    }

    /// True if any entry references the given dotted OID
    #[must_use]
    pub fn contains_oid(&self, oid: &str) -> bool {
        self.entries.iter().any(|d| d.oid.as_deref() == Some(oid))
    }

    /// Iterate over the diagnostics in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the diagnostics as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }
}

impl fmt::Display for CertErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.entries {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CertErrors {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

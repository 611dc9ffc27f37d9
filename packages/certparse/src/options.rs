//! Parser configuration
//!
//! Provides the options structure and presets for strict and lenient parsing.

use serde::{Deserialize, Serialize};

/// Options controlling how strictly certificate fields are checked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseCertificateOptions {
    /// Accept serial numbers that violate RFC 5280 section 4.1.2.2
    ///
    /// When set, a serial longer than 20 octets or one that is not a
    /// minimally encoded INTEGER is recorded as a warning instead of failing
    /// the parse. An empty serial number always fails.
    pub allow_invalid_serial_numbers: bool,
}

impl ParseCertificateOptions {
    /// RFC 5280 conformant parsing (the default)
    #[must_use]
    pub fn strict() -> Self {
        Self {
            allow_invalid_serial_numbers: false,
        }
    }

    /// Parsing tolerant of common real-world serial number violations
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            allow_invalid_serial_numbers: true,
        }
    }
}

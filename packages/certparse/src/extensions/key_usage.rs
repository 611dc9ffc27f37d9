//! KeyUsage (2.5.29.15)

use std::fmt;

use crate::error::{DecodeError, DecodeResult};
use crate::input::{BitString, Input, Parser, Tag};

/// Named bits of the KeyUsage BIT STRING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUsageBit {
    /// digitalSignature (0)
    DigitalSignature = 0,
    /// nonRepudiation / contentCommitment (1)
    NonRepudiation = 1,
    /// keyEncipherment (2)
    KeyEncipherment = 2,
    /// dataEncipherment (3)
    DataEncipherment = 3,
    /// keyAgreement (4)
    KeyAgreement = 4,
    /// keyCertSign (5)
    KeyCertSign = 5,
    /// cRLSign (6)
    CrlSign = 6,
    /// encipherOnly (7)
    EncipherOnly = 7,
    /// decipherOnly (8)
    DecipherOnly = 8,
}

impl KeyUsageBit {
    /// All named bits in bit order
    pub const ALL: [KeyUsageBit; 9] = [
        KeyUsageBit::DigitalSignature,
        KeyUsageBit::NonRepudiation,
        KeyUsageBit::KeyEncipherment,
        KeyUsageBit::DataEncipherment,
        KeyUsageBit::KeyAgreement,
        KeyUsageBit::KeyCertSign,
        KeyUsageBit::CrlSign,
        KeyUsageBit::EncipherOnly,
        KeyUsageBit::DecipherOnly,
    ];

    fn name(self) -> &'static str {
        match self {
            KeyUsageBit::DigitalSignature => "digitalSignature",
            KeyUsageBit::NonRepudiation => "nonRepudiation",
            KeyUsageBit::KeyEncipherment => "keyEncipherment",
            KeyUsageBit::DataEncipherment => "dataEncipherment",
            KeyUsageBit::KeyAgreement => "keyAgreement",
            KeyUsageBit::KeyCertSign => "keyCertSign",
            KeyUsageBit::CrlSign => "cRLSign",
            KeyUsageBit::EncipherOnly => "encipherOnly",
            KeyUsageBit::DecipherOnly => "decipherOnly",
        }
    }
}

impl fmt::Display for KeyUsageBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// KeyUsage ::= BIT STRING
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyUsage {
    bits: BitString,
}

impl KeyUsage {
    /// True if the certificate asserts `bit`
    #[must_use]
    pub fn asserts(&self, bit: KeyUsageBit) -> bool {
        self.bits.asserts_bit(bit as usize)
    }

    /// The asserted named bits
    pub fn iter(&self) -> impl Iterator<Item = KeyUsageBit> + '_ {
        KeyUsageBit::ALL.into_iter().filter(|bit| self.asserts(*bit))
    }

    /// The raw bit string
    #[must_use]
    pub fn bit_string(&self) -> &BitString {
        &self.bits
    }
}

/// Decode a KeyUsage extension value
///
/// At least one bit must be set (RFC 5280 section 4.2.1.3).
pub fn decode_key_usage(value: &Input) -> DecodeResult<KeyUsage> {
    let mut parser = Parser::new(value.clone());
    let contents = parser.read_tag(Tag::BIT_STRING)?;
    parser.finish()?;

    let bits = BitString::parse(&contents)?;
    if !bits.any_bit_set() {
        return Err(DecodeError::invalid(
            contents.offset(),
            "KeyUsage",
            "no bits are set",
        ));
    }
    Ok(KeyUsage { bits })
}

//! DER assembly helpers shared by the integration tests

#![allow(dead_code)]

use const_oid::ObjectIdentifier;

pub const TAG_BOOLEAN: u8 = 0x01;
pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_OID: u8 = 0x06;
pub const TAG_UTF8_STRING: u8 = 0x0C;
pub const TAG_PRINTABLE_STRING: u8 = 0x13;
pub const TAG_IA5_STRING: u8 = 0x16;
pub const TAG_UTC_TIME: u8 = 0x17;
pub const TAG_BMP_STRING: u8 = 0x1E;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_SET: u8 = 0x31;

pub const OID_COMMON_NAME: &str = "2.5.4.3";
pub const OID_ORGANIZATION: &str = "2.5.4.10";
pub const OID_ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";

/// Encode one TLV with a DER length
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (bytes.len() - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
    out.extend_from_slice(content);
    out
}

pub fn seq(parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, &parts.concat())
}

pub fn set(parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(TAG_SET, &parts.concat())
}

pub fn oid(dotted: &str) -> Vec<u8> {
    let oid = ObjectIdentifier::new(dotted).expect("valid test OID");
    tlv(TAG_OID, oid.as_bytes())
}

pub fn integer(content: &[u8]) -> Vec<u8> {
    tlv(TAG_INTEGER, content)
}

pub fn boolean(value: bool) -> Vec<u8> {
    tlv(TAG_BOOLEAN, &[if value { 0xFF } else { 0x00 }])
}

pub fn octet_string(content: &[u8]) -> Vec<u8> {
    tlv(TAG_OCTET_STRING, content)
}

/// A Name with one RDN per `(attribute OID, string tag, value)` entry
pub fn name(attributes: &[(&str, u8, &[u8])]) -> Vec<u8> {
    let rdns: Vec<Vec<u8>> = attributes
        .iter()
        .map(|(attr, tag, value)| set(&[seq(&[oid(attr), tlv(*tag, value)])]))
        .collect();
    seq(&rdns)
}

/// `CN=<cn>` as a UTF8String
pub fn common_name(cn: &str) -> Vec<u8> {
    name(&[(OID_COMMON_NAME, TAG_UTF8_STRING, cn.as_bytes())])
}

/// One Extension; `critical == false` omits the BOOLEAN as DER requires
pub fn extension(extn_id: &str, critical: bool, value: &[u8]) -> Vec<u8> {
    extension_with_oid_bytes(&oid(extn_id)[2..], critical, value)
}

/// One Extension whose extnID contents are given as raw octets
pub fn extension_with_oid_bytes(extn_id: &[u8], critical: bool, value: &[u8]) -> Vec<u8> {
    let mut parts = vec![tlv(TAG_OID, extn_id)];
    if critical {
        parts.push(boolean(true));
    }
    parts.push(octet_string(value));
    seq(&parts)
}

/// Assembles test certificates field by field
#[derive(Debug, Clone)]
pub struct CertBuilder {
    /// Encoded version INTEGER value; `None` omits the field (v1)
    pub version: Option<u8>,
    /// serialNumber INTEGER contents
    pub serial: Vec<u8>,
    /// TBS signature AlgorithmIdentifier TLV
    pub tbs_signature: Vec<u8>,
    pub issuer: Vec<u8>,
    pub not_before: Vec<u8>,
    pub not_after: Vec<u8>,
    pub subject: Vec<u8>,
    pub spki: Vec<u8>,
    /// issuerUniqueID contents (BIT STRING contents)
    pub issuer_unique_id: Option<Vec<u8>>,
    /// Extension TLVs; an empty list omits the extensions field
    pub extensions: Vec<Vec<u8>>,
    /// Replaces the `[3]` extensions wrapper contents verbatim when set
    pub raw_extensions: Option<Vec<u8>>,
    /// Outer signatureAlgorithm TLV
    pub signature_algorithm: Vec<u8>,
    /// signatureValue BIT STRING contents
    pub signature: Vec<u8>,
}

impl Default for CertBuilder {
    fn default() -> Self {
        let ecdsa_sha256 = seq(&[oid(OID_ECDSA_WITH_SHA256)]);
        Self {
            version: Some(2),
            serial: vec![0x01],
            tbs_signature: ecdsa_sha256.clone(),
            issuer: common_name("Test Root CA"),
            not_before: tlv(TAG_UTC_TIME, b"250101000000Z"),
            not_after: tlv(TAG_UTC_TIME, b"350101000000Z"),
            subject: common_name("leaf.example.com"),
            spki: seq(&[
                seq(&[oid("1.2.840.10045.2.1"), oid("1.2.840.10045.3.1.7")]),
                tlv(TAG_BIT_STRING, &[0x00, 0x04, 0x01, 0x02, 0x03, 0x04]),
            ]),
            issuer_unique_id: None,
            extensions: Vec::new(),
            raw_extensions: None,
            signature_algorithm: ecdsa_sha256,
            signature: vec![0x00, 0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01],
        }
    }
}

impl CertBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn v1() -> Self {
        Self {
            version: None,
            ..Self::default()
        }
    }

    pub fn extension(mut self, extn_id: &str, critical: bool, value: &[u8]) -> Self {
        self.extensions.push(extension(extn_id, critical, value));
        self
    }

    pub fn subject(mut self, subject: Vec<u8>) -> Self {
        self.subject = subject;
        self
    }

    pub fn serial(mut self, serial: &[u8]) -> Self {
        self.serial = serial.to_vec();
        self
    }

    pub fn tbs(&self) -> Vec<u8> {
        let mut fields = Vec::new();
        if let Some(version) = self.version {
            fields.push(tlv(0xA0, &integer(&[version])));
        }
        fields.push(integer(&self.serial));
        fields.push(self.tbs_signature.clone());
        fields.push(self.issuer.clone());
        fields.push(seq(&[self.not_before.clone(), self.not_after.clone()]));
        fields.push(self.subject.clone());
        fields.push(self.spki.clone());
        if let Some(id) = &self.issuer_unique_id {
            fields.push(tlv(0x81, id));
        }
        if let Some(raw) = &self.raw_extensions {
            fields.push(tlv(0xA3, raw));
        } else if !self.extensions.is_empty() {
            fields.push(tlv(0xA3, &seq(&self.extensions)));
        }
        seq(&fields)
    }

    pub fn build(&self) -> Vec<u8> {
        seq(&[
            self.tbs(),
            self.signature_algorithm.clone(),
            tlv(TAG_BIT_STRING, &self.signature),
        ])
    }
}

//! Integration tests for the ParsedCertificate factory and accessors

#![allow(clippy::uninlined_format_args)]

mod support;

use std::sync::Arc;

use certparse::{
    oids, CertError, CertificateVersion, DecodeError, ExtensionKind, ParseCertificateOptions,
    ParsedCertificate, ParsedCertificateList, SignatureScheme,
};
use certparse_common::{CertErrors, LoggingTransformer, Severity};
use chrono::Datelike;
use hex_literal::hex;
use support::*;

fn create(der: &[u8]) -> (Result<Arc<ParsedCertificate>, CertError>, CertErrors) {
    LoggingTransformer::init_test();
    let mut errors = CertErrors::new();
    let result = ParsedCertificate::create(der, &ParseCertificateOptions::default(), Some(&mut errors));
    (result, errors)
}

#[test]
fn minimal_certificate_has_no_extensions() {
    let der = CertBuilder::new().build();
    let (result, errors) = create(&der);
    let cert = result.expect("minimal certificate parses");

    assert!(errors.is_empty(), "unexpected diagnostics: {}", errors);
    assert_eq!(cert.tbs().version, CertificateVersion::V3);
    assert!(cert.extensions().is_empty());

    assert!(!cert.has_basic_constraints());
    assert!(!cert.has_key_usage());
    assert!(!cert.has_extended_key_usage());
    assert!(!cert.has_subject_alt_names());
    assert!(!cert.has_name_constraints());
    assert!(!cert.has_authority_info_access());
    assert!(!cert.has_policy_oids());
    assert!(!cert.has_policy_constraints());
    assert!(!cert.has_policy_mappings());
    assert!(!cert.has_inhibit_any_policy());
    assert!(!cert.has_authority_key_identifier());
    assert!(!cert.has_subject_key_identifier());
    for kind in ExtensionKind::ALL {
        assert!(cert.known_extension(kind).is_none(), "{} present", kind);
    }
    assert!(cert.policy_oids().is_none());
    assert_eq!(cert.ca_issuers_uris().count(), 0);
    assert_eq!(cert.ocsp_uris().count(), 0);
}

#[test]
fn raw_views_point_into_the_certificate() {
    let builder = CertBuilder::new();
    let der = builder.build();
    let (result, _) = create(&der);
    let cert = result.expect("certificate parses");

    assert_eq!(cert.der_cert().as_bytes(), der.as_slice());
    assert_eq!(cert.tbs_certificate_tlv().as_bytes(), builder.tbs().as_slice());
    assert_eq!(cert.signature_algorithm_tlv().as_bytes(), builder.signature_algorithm.as_slice());
    assert_eq!(cert.subject_tlv().as_bytes(), builder.subject.as_slice());
    assert_eq!(cert.issuer_tlv().as_bytes(), builder.issuer.as_slice());
    assert_eq!(cert.tbs().spki_tlv.as_bytes(), builder.spki.as_slice());
    assert_eq!(cert.tbs().serial_number.as_bytes(), &[0x01]);
    assert_eq!(cert.signature_value().bytes().as_bytes(), &builder.signature[1..]);
    assert_eq!(cert.signature_value().unused_bits(), 0);

    let tbs_offset = cert.tbs_certificate_tlv().offset();
    assert_eq!(&der[tbs_offset..tbs_offset + cert.tbs_certificate_tlv().len()], builder.tbs().as_slice());

    assert_eq!(cert.signature_algorithm().scheme(), SignatureScheme::Ecdsa);
    assert_eq!(cert.tbs().validity_not_before.year(), 2025);
    assert_eq!(cert.tbs().validity_not_after.year(), 2035);
}

#[test]
fn v1_certificate_without_version_field() {
    let der = CertBuilder::v1().build();
    let (result, _) = create(&der);
    let cert = result.expect("v1 certificate parses");
    assert_eq!(cert.tbs().version, CertificateVersion::V1);
    assert!(cert.tbs().extensions_tlv.is_none());
}

#[test]
fn explicit_v1_version_is_rejected() {
    let der = CertBuilder {
        version: Some(0),
        ..CertBuilder::default()
    }
    .build();
    let (result, errors) = create(&der);
    assert!(matches!(
        result,
        Err(CertError::Malformed {
            field: "tbsCertificate",
            source: DecodeError::InvalidValue { what: "version", .. }
        })
    ));
    assert!(errors.contains_error());
}

#[test]
fn extensions_require_v3() {
    let mut builder = CertBuilder::v1().extension("2.5.29.19", true, &hex!("30 00"));
    assert!(create(&builder.build()).0.is_err());

    builder.version = Some(1);
    assert!(create(&builder.build()).0.is_err());

    builder.version = Some(2);
    assert!(create(&builder.build()).0.is_ok());
}

#[test]
fn unique_ids_rejected_in_v1() {
    let mut builder = CertBuilder::v1();
    builder.issuer_unique_id = Some(vec![0x00, 0xAB]);
    assert!(create(&builder.build()).0.is_err());

    builder.version = Some(1);
    let (result, _) = create(&builder.build());
    let cert = result.expect("v2 certificate with issuerUniqueID parses");
    let id = cert.tbs().issuer_unique_id.as_ref().expect("issuerUniqueID present");
    assert_eq!(id.bytes().as_bytes(), &[0xAB]);
    assert!(cert.tbs().subject_unique_id.is_none());
}

#[test]
fn ca_certificate_without_key_usage() {
    let der = CertBuilder::new()
        .extension("2.5.29.19", true, &hex!("30 06 01 01 FF 02 01 00"))
        .build();
    let (result, _) = create(&der);
    let cert = result.expect("CA certificate parses");

    assert!(cert.has_basic_constraints());
    let bc = cert.basic_constraints().expect("basicConstraints present");
    assert!(bc.is_ca);
    assert_eq!(bc.path_len, Some(0));
    assert!(!cert.has_key_usage());
    assert!(cert.extension(oids::BASIC_CONSTRAINTS.as_bytes()).is_some_and(|ext| ext.critical));
}

#[test]
fn extended_key_usage_preserves_order() {
    let der = CertBuilder::new()
        .extension(
            "2.5.29.37",
            false,
            &hex!("30 14 06 08 2B06010505070302 06 08 2B06010505070301"),
        )
        .build();
    let (result, _) = create(&der);
    let cert = result.expect("certificate parses");

    let eku = cert.extended_key_usage().expect("extKeyUsage present");
    assert_eq!(eku, &vec![oids::KP_CLIENT_AUTH, oids::KP_SERVER_AUTH]);
}

#[test]
fn duplicate_extension_is_fatal() {
    let der = CertBuilder::new()
        .extension("2.5.29.37", false, &hex!("30 0A 06 08 2B06010505070301"))
        .extension("2.5.29.37", false, &hex!("30 0A 06 08 2B06010505070302"))
        .build();
    let (result, errors) = create(&der);

    match result {
        Err(CertError::DuplicateExtension { oid, .. }) => assert_eq!(oid, oids::EXTENDED_KEY_USAGE),
        other => panic!("expected DuplicateExtension, got {:?}", other),
    }
    assert!(errors.contains_oid("2.5.29.37"));
}

#[test]
fn duplicate_unknown_extension_is_fatal() {
    let der = CertBuilder::new()
        .extension("1.2.3.4", false, &hex!("05 00"))
        .extension("1.2.3.4", false, &hex!("05 00"))
        .build();
    assert!(matches!(create(&der).0, Err(CertError::DuplicateExtension { .. })));
}

#[test]
fn malformed_basic_constraints_names_the_oid() {
    let der = CertBuilder::new()
        .extension("2.5.29.19", true, &hex!("04 00"))
        .build();
    let (result, errors) = create(&der);

    match result {
        Err(CertError::Extension { kind, oid, .. }) => {
            assert_eq!(kind, ExtensionKind::BasicConstraints);
            assert_eq!(oid, oids::BASIC_CONSTRAINTS);
        }
        other => panic!("expected Extension error, got {:?}", other),
    }
    assert!(errors.contains_error());
    assert!(errors.contains_oid("2.5.29.19"));
    let entry = errors.iter().find(|d| d.severity == Severity::Error).expect("error entry");
    assert!(entry.offset.is_some());
}

#[test]
fn empty_extensions_sequence_is_fatal() {
    let builder = CertBuilder {
        raw_extensions: Some(hex!("30 00").to_vec()),
        ..CertBuilder::default()
    };
    assert!(matches!(
        create(&builder.build()).0,
        Err(CertError::Malformed { field: "extensions", .. })
    ));
}

#[test]
fn explicit_critical_false_is_accepted() {
    let ext = seq(&[oid("2.5.29.14"), boolean(false), octet_string(&hex!("04 02 AB CD"))]);
    let builder = CertBuilder {
        extensions: vec![ext],
        ..CertBuilder::default()
    };
    let (result, _) = create(&builder.build());
    let cert = result.expect("certificate parses");
    let ski = cert.subject_key_identifier().expect("subjectKeyIdentifier present");
    assert_eq!(ski.as_bytes(), &hex!("AB CD"));
    assert!(!cert.extension(oids::SUBJECT_KEY_IDENTIFIER.as_bytes()).expect("registered").critical);
}

#[test]
fn unknown_critical_extension_is_deferred() {
    let unknown = const_oid::ObjectIdentifier::new_unwrap("1.3.6.1.4.1.11129.2.4.2");
    let der = CertBuilder::new()
        .extension("1.3.6.1.4.1.11129.2.4.2", true, &hex!("04 00"))
        .extension("2.5.29.19", true, &hex!("30 00"))
        .build();
    let (result, errors) = create(&der);
    let cert = result.expect("unknown critical extension does not fail parsing");

    assert!(errors.is_empty());
    let ext = cert.extension(unknown.as_bytes()).expect("generic lookup finds it");
    assert!(ext.critical);
    assert_eq!(ext.value.as_bytes(), &hex!("04 00"));
    let unhandled: Vec<_> = cert.unhandled_critical_extensions().map(|e| e.oid.clone()).collect();
    assert_eq!(unhandled, vec![unknown]);
}

#[test]
fn unrecognized_extensions_with_long_oids() {
    // 2.25.329800735698586629295641978511506172918
    let uuid_oid = hex!("69 83F09DA7EBCFDEE0C7A1A7B2C0948CC8F9D776");
    let mut long_oid = hex!("2B 06 01 04 01").to_vec();
    long_oid.extend_from_slice(&[0x01; 40]);
    assert_eq!(long_oid.len(), 45);

    let builder = CertBuilder {
        extensions: vec![
            extension_with_oid_bytes(&uuid_oid, false, &hex!("05 00")),
            extension_with_oid_bytes(&long_oid, true, &hex!("04 01 AA")),
        ],
        ..CertBuilder::default()
    };
    let (result, errors) = create(&builder.build());
    let cert = result.expect("long extension OIDs parse");
    assert!(errors.is_empty(), "unexpected diagnostics: {}", errors);

    let uuid_ext = cert.extension(&uuid_oid).expect("UUID OID registered");
    assert_eq!(uuid_ext.value.as_bytes(), &hex!("05 00"));
    assert_eq!(uuid_ext.oid.to_string(), "2.25.329800735698586629295641978511506172918");

    let long_ext = cert.extension(&long_oid).expect("45-byte OID registered");
    assert!(long_ext.critical);
    assert_eq!(long_ext.value.as_bytes(), &hex!("04 01 AA"));

    let unhandled: Vec<_> = cert.unhandled_critical_extensions().map(|e| e.oid.as_bytes().to_vec()).collect();
    assert_eq!(unhandled, vec![long_oid.clone()]);

    let duplicate = CertBuilder {
        extensions: vec![
            extension_with_oid_bytes(&long_oid, false, &hex!("05 00")),
            extension_with_oid_bytes(&long_oid, false, &hex!("05 00")),
        ],
        ..CertBuilder::default()
    };
    match create(&duplicate.build()).0 {
        Err(CertError::DuplicateExtension { oid, .. }) => assert_eq!(oid.as_bytes(), long_oid.as_slice()),
        other => panic!("expected DuplicateExtension, got {:?}", other),
    }
}

#[test]
fn malformed_extension_oid_is_fatal() {
    let builder = CertBuilder {
        extensions: vec![extension_with_oid_bytes(&hex!("2A 80 01"), false, &hex!("05 00"))],
        ..CertBuilder::default()
    };
    let (result, errors) = create(&builder.build());
    assert!(result.is_err());
    assert!(errors.contains_error());
}

#[test]
fn validity_before_1970() {
    let builder = CertBuilder {
        not_before: tlv(TAG_UTC_TIME, b"500101000000Z"),
        not_after: tlv(0x18, b"19690720201800Z"),
        ..CertBuilder::default()
    };
    let (result, _) = create(&builder.build());
    let cert = result.expect("pre-1970 validity parses");
    assert_eq!(cert.tbs().validity_not_before.year(), 1950);
    assert_eq!(cert.tbs().validity_not_after.year(), 1969);
    assert!(cert.tbs().validity_not_before < cert.tbs().validity_not_after);
}

#[test]
fn subject_alt_name_must_be_critical_with_empty_subject() {
    let san = hex!("30 07 82 05 612E636F6D");
    let empty_subject = seq(&[]);

    let der = CertBuilder::new()
        .subject(empty_subject.clone())
        .extension("2.5.29.17", false, &san)
        .build();
    let (result, errors) = create(&der);
    assert!(matches!(result, Err(CertError::SubjectAltNameNotCritical { .. })));
    assert!(errors.contains_oid("2.5.29.17"));

    let der = CertBuilder::new()
        .subject(empty_subject)
        .extension("2.5.29.17", true, &san)
        .build();
    let (result, _) = create(&der);
    let cert = result.expect("critical SAN with empty subject parses");
    let names = cert.subject_alt_names().expect("SAN present");
    assert_eq!(names.dns_names().collect::<Vec<_>>(), vec!["a.com"]);
    assert!(cert.subject_alt_names_extension().is_some_and(|ext| ext.critical));
    assert_eq!(cert.normalized_subject(), Some(&[][..]));
}

#[test]
fn authority_info_access_uris() {
    let der = CertBuilder::new()
        .extension(
            "1.3.6.1.5.5.7.1.1",
            false,
            &hex!(
                "30 2C"
                "30 14 06 08 2B06010505073001 86 08 687474703A2F2F6F"
                "30 14 06 08 2B06010505073002 86 08 687474703A2F2F63"
            ),
        )
        .build();
    let (result, _) = create(&der);
    let cert = result.expect("certificate parses");

    assert_eq!(cert.ocsp_uris().collect::<Vec<_>>(), vec!["http://o"]);
    assert_eq!(cert.ca_issuers_uris().collect::<Vec<_>>(), vec!["http://c"]);
    assert!(cert.authority_info_access_extension().is_some());
}

#[test]
fn policy_extensions_parse_together() {
    let der = CertBuilder::new()
        .extension("2.5.29.32", false, &hex!("30 08 30 06 06 04 551D2000"))
        .extension("2.5.29.36", true, &hex!("30 03 80 01 00"))
        .extension("2.5.29.33", false, &hex!("30 0C 30 0A 06 03 2A0304 06 03 2A0305"))
        .extension("2.5.29.54", true, &hex!("02 01 01"))
        .build();
    let (result, _) = create(&der);
    let cert = result.expect("certificate parses");

    assert_eq!(cert.policy_oids().expect("policies present"), vec![oids::ANY_POLICY]);
    assert_eq!(cert.policy_constraints().and_then(|pc| pc.require_explicit_policy), Some(0));
    assert_eq!(cert.policy_mappings().map(Vec::len), Some(1));
    assert_eq!(cert.inhibit_any_policy(), Some(&1));
}

#[test]
fn serial_number_rules() {
    // 21 octets
    let long_serial = [0x01; 21];
    let der = CertBuilder::new().serial(&long_serial).build();

    let (result, errors) = create(&der);
    assert!(result.is_err());
    assert!(errors.contains_error());

    let mut errors = CertErrors::new();
    let cert = ParsedCertificate::create(&der, &ParseCertificateOptions::lenient(), Some(&mut errors))
        .expect("lenient parsing accepts a long serial");
    assert_eq!(cert.tbs().serial_number.len(), 21);
    assert!(!errors.contains_error());
    assert!(errors.contains_severity(Severity::Warning));

    let (result, errors) = create(&CertBuilder::new().serial(&[0xFF]).build());
    assert!(result.is_ok(), "negative serial is only a warning");
    assert!(errors.iter().any(|d| d.message.contains("negative")));

    let (result, errors) = create(&CertBuilder::new().serial(&[0x00]).build());
    assert!(result.is_ok(), "zero serial is only a warning");
    assert!(errors.iter().any(|d| d.message.contains("zero")));

    assert!(create(&CertBuilder::new().serial(&[]).build()).0.is_err());
}

#[test]
fn non_minimal_serial_is_accepted_when_lenient() {
    let der = CertBuilder::new().serial(&[0x00, 0x01]).build();
    let (result, errors) = create(&der);
    assert!(matches!(result, Err(CertError::Malformed { .. })));
    assert!(errors.contains_error());

    let mut errors = CertErrors::new();
    let cert = ParsedCertificate::create(&der, &ParseCertificateOptions::lenient(), Some(&mut errors))
        .expect("lenient parsing accepts a padded serial");
    assert_eq!(cert.tbs().serial_number.as_bytes(), &[0x00, 0x01]);
    assert!(!errors.contains_error());
    assert!(errors.iter().any(|d| d.severity == Severity::Warning && d.message.contains("serial")));

    // leniency does not extend to an empty INTEGER
    let der = CertBuilder::new().serial(&[]).build();
    assert!(ParsedCertificate::create(&der, &ParseCertificateOptions::lenient(), None).is_err());
}

#[test]
fn unsupported_signature_algorithm_is_fatal() {
    let builder = CertBuilder {
        signature_algorithm: seq(&[oid("1.2.3.4")]),
        ..CertBuilder::default()
    };
    assert!(matches!(
        create(&builder.build()).0,
        Err(CertError::Malformed {
            field: "signatureAlgorithm",
            source: DecodeError::UnsupportedAlgorithm { .. }
        })
    ));
}

#[test]
fn trailing_data_is_rejected() {
    let mut der = CertBuilder::new().build();
    der.push(0x00);
    assert!(matches!(
        create(&der).0,
        Err(CertError::Malformed {
            source: DecodeError::TrailingData { .. },
            ..
        })
    ));
}

#[test]
fn normalized_subjects_match_across_encodings() {
    let a = CertBuilder::new()
        .subject(name(&[
            (OID_ORGANIZATION, TAG_PRINTABLE_STRING, b"  Example   Corp "),
            (OID_COMMON_NAME, TAG_PRINTABLE_STRING, b"Leaf"),
        ]))
        .build();
    let b = CertBuilder::new()
        .subject(name(&[
            (OID_ORGANIZATION, TAG_UTF8_STRING, b"example corp"),
            (OID_COMMON_NAME, TAG_BMP_STRING, &[0x00, b'L', 0x00, b'E', 0x00, b'A', 0x00, b'F']),
        ]))
        .build();

    let cert_a = create(&a).0.expect("a parses");
    let cert_b = create(&b).0.expect("b parses");
    assert_ne!(cert_a.subject_tlv(), cert_b.subject_tlv());
    assert_eq!(cert_a.normalized_subject(), cert_b.normalized_subject());
    assert!(cert_a.normalized_subject().is_some());
    assert_eq!(cert_a.normalized_issuer(), cert_b.normalized_issuer());
}

#[test]
fn normalization_failure_is_a_warning() {
    let der = CertBuilder::new()
        .subject(name(&[(OID_COMMON_NAME, TAG_PRINTABLE_STRING, b"user@example.com")]))
        .build();
    let (result, errors) = create(&der);
    let cert = result.expect("invalid PrintableString does not fail parsing");

    assert!(cert.normalized_subject().is_none());
    assert!(cert.normalized_issuer().is_some());
    assert!(!errors.contains_error());
    assert!(errors.iter().any(|d| d.severity == Severity::Warning && d.message.contains("subject")));
}

#[test]
fn create_and_add_to_vector_only_appends_on_success() {
    LoggingTransformer::init_test();
    let options = ParseCertificateOptions::default();
    let mut chain = ParsedCertificateList::new();

    let good = CertBuilder::new().build();
    assert!(ParsedCertificate::create_and_add_to_vector(&good, &options, &mut chain, None));
    assert_eq!(chain.len(), 1);

    let bad = CertBuilder::new()
        .extension("2.5.29.19", true, &hex!("30 03 02 01"))
        .build();
    let mut errors = CertErrors::new();
    assert!(!ParsedCertificate::create_and_add_to_vector(&bad, &options, &mut chain, Some(&mut errors)));
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].der_cert().as_bytes(), good.as_slice());
    assert!(errors.contains_error());
}

#[test]
fn parsed_certificate_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ParsedCertificate>();

    let cert = create(&CertBuilder::new().build()).0.expect("certificate parses");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cert = Arc::clone(&cert);
            std::thread::spawn(move || cert.tbs().serial_number.as_bytes().to_vec())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread completes"), vec![0x01]);
    }
}

#[test]
fn buffer_outlives_the_caller_copy() {
    let cert = {
        let der = CertBuilder::new().build();
        create(&der).0.expect("certificate parses")
    };
    let subject = cert.subject_tlv().clone();
    drop(cert);
    assert_eq!(subject.as_bytes(), common_name("leaf.example.com").as_slice());
}

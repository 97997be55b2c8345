mod common;

use anyhow::anyhow;
use chrono::Utc;
use common::{Chain, KeyAlgorithm};
use pkd_engine as pkd;

struct FailingCrls;

impl pkd::CrlLookup for FailingCrls {
    fn find_by_issuer(&self, _issuer: &pkd::DistinguishedName) -> anyhow::Result<Option<pkd::CertificateRevocationList>> {
        Err(anyhow!("directory unreachable"))
    }
}

struct PanickingCrls;

impl pkd::CrlLookup for PanickingCrls {
    fn find_by_issuer(&self, _issuer: &pkd::DistinguishedName) -> anyhow::Result<Option<pkd::CertificateRevocationList>> {
        panic!("backend crashed")
    }
}

#[test]
fn listed_serial_is_revoked() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let crls = pkd::InMemoryCrlStore::new();
    crls.insert(common::crl(&chain.intermediate_party.dn(), 30, &["0x01"])).unwrap();

    let checker = pkd::RevocationChecker::new(&crls, Utc::now());
    assert_eq!(chain.leaf.serial_number(), &"0x01".parse::<pkd::SerialNumber>().unwrap());
    assert!(checker.is_revoked(&chain.leaf));
    assert_eq!(checker.check(&chain.leaf), pkd::RevocationStatus::Revoked);
}

#[test]
fn serial_spelling_does_not_matter() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let now = Utc::now();

    for spelling in ["0x01", "01", "00:01", "1"] {
        let crls = pkd::InMemoryCrlStore::new();
        crls.insert(common::crl(&chain.intermediate_party.dn(), 30, &[spelling])).unwrap();
        assert!(pkd::RevocationChecker::new(&crls, now).is_revoked(&chain.leaf), "{spelling}");
    }
}

#[test]
fn missing_crl_means_not_revoked() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let crls = pkd::InMemoryCrlStore::new();
    // A CRL exists, but for a different issuer.
    crls.insert(common::crl(&chain.root_party.dn(), 30, &["0x01"])).unwrap();

    let checker = pkd::RevocationChecker::new(&crls, Utc::now());
    assert!(!checker.is_revoked(&chain.leaf));
    assert_eq!(
        checker.check(&chain.leaf),
        pkd::RevocationStatus::Unknown(pkd::validation::Degradation::NoCrl)
    );
}

#[test]
fn revoked_leaf_outranks_other_statuses() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let crls = pkd::InMemoryCrlStore::new();
    crls.insert(common::crl(&chain.intermediate_party.dn(), 30, &["0x01", "0x99"])).unwrap();

    let result = pkd::validate(&chain.leaf, &chain.store(), &crls, &pkd::ValidationConfig::default(), true)
        .expect("validate");
    assert_eq!(result.status, pkd::CertificateStatus::Revoked);
    assert_eq!(result.not_revoked, Some(false));
    assert_eq!(result.signature_valid, Some(true));

    let revocation: Vec<_> = result.errors_in(pkd::ErrorCategory::Revocation).collect();
    assert_eq!(revocation.len(), 1);
    assert_eq!(revocation[0].code, pkd::ErrorCode::Revoked);
    assert!(revocation[0].is_error());
}

#[test]
fn revocation_skipped_when_not_requested() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let crls = pkd::InMemoryCrlStore::new();
    crls.insert(common::crl(&chain.intermediate_party.dn(), 30, &["0x01"])).unwrap();

    let result = pkd::validate(&chain.leaf, &chain.store(), &crls, &pkd::ValidationConfig::default(), false)
        .expect("validate");
    assert_eq!(result.not_revoked, None);
    assert!(result.is_valid());
}

#[test]
fn expired_crl_fails_open_with_warning() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let crls = pkd::InMemoryCrlStore::new();
    crls.insert(common::crl(&chain.intermediate_party.dn(), -1, &["0x01"])).unwrap();

    let checker = pkd::RevocationChecker::new(&crls, Utc::now());
    assert!(matches!(
        checker.check(&chain.leaf),
        pkd::RevocationStatus::Unknown(pkd::validation::Degradation::CrlExpired { .. })
    ));

    let result = pkd::validate(&chain.leaf, &chain.store(), &crls, &pkd::ValidationConfig::default(), true)
        .expect("validate");
    assert!(result.is_valid());
    assert_eq!(result.not_revoked, Some(true));
    let warnings: Vec<_> = result.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, pkd::ErrorCode::CrlExpired);
}

#[test]
fn failing_lookup_fails_open() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let checker = pkd::RevocationChecker::new(&FailingCrls, Utc::now());
    assert!(!checker.is_revoked(&chain.leaf));

    let result = pkd::validate(&chain.leaf, &chain.store(), &FailingCrls, &pkd::ValidationConfig::default(), true)
        .expect("validate");
    assert!(result.is_valid());
    assert_eq!(result.warnings().next().map(|w| w.code), Some(pkd::ErrorCode::RevocationLookupFailed));
}

#[test]
fn panicking_lookup_fails_open() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let checker = pkd::RevocationChecker::new(&PanickingCrls, Utc::now());

    match checker.check(&chain.leaf) {
        pkd::RevocationStatus::Unknown(pkd::validation::Degradation::LookupFailed(_)) => {}
        other => panic!("unexpected status: {other:?}"),
    }
}

#[test]
fn full_path_scope_checks_every_certificate() {
    let chain = Chain::generate(KeyAlgorithm::Ecdsa);
    let crls = pkd::InMemoryCrlStore::new();
    // Root revokes the intermediate (serial 0xC8 = 200).
    crls.insert(common::crl(&chain.root_party.dn(), 30, &["0xC8"])).unwrap();
    crls.insert(common::crl(&chain.intermediate_party.dn(), 30, &[])).unwrap();
    let store = chain.store();

    let leaf_only = pkd::validate(&chain.leaf, &store, &crls, &pkd::ValidationConfig::default(), true)
        .expect("leaf only");
    assert_eq!(leaf_only.status, pkd::CertificateStatus::Valid);

    let config = pkd::ValidationConfig {
        revocation_scope: pkd::RevocationScope::FullPath,
        ..pkd::ValidationConfig::default()
    };
    let full = pkd::validate(&chain.leaf, &store, &crls, &config, true).expect("full path");
    assert_eq!(full.status, pkd::CertificateStatus::Revoked);
    let revoked: Vec<_> = full.errors.iter().filter(|e| e.code == pkd::ErrorCode::Revoked).collect();
    assert_eq!(revoked.len(), 1);
    assert_eq!(revoked[0].subject, chain.intermediate_party.dn());
    // The root is self-issued; its own CRL does not list it, and nothing else is missing.
    assert_eq!(full.warnings().count(), 0);
}

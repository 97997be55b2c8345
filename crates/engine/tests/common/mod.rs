#![allow(dead_code)]

use std::str::FromStr;

use openssl::asn1::{Asn1Object, Asn1OctetString, Asn1Time};
use openssl::bn::BigNum;
use openssl::dsa::Dsa;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::{X509Builder, X509Extension, X509Name, X509NameBuilder};

use pkd_engine as pkd;

const DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy)]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Ecdsa,
    Ed25519,
}

impl KeyAlgorithm {
    pub fn generate(self) -> PKey<Private> {
        match self {
            KeyAlgorithm::Rsa => PKey::from_rsa(Rsa::generate(2048).expect("rsa key")).expect("pkey"),
            KeyAlgorithm::Dsa => PKey::from_dsa(Dsa::generate(2048).expect("dsa key")).expect("pkey"),
            KeyAlgorithm::Ecdsa => {
                let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).expect("p-256");
                PKey::from_ec_key(EcKey::generate(&group).expect("ec key")).expect("pkey")
            }
            KeyAlgorithm::Ed25519 => PKey::generate_ed25519().expect("ed25519 key"),
        }
    }

    fn digest(self) -> MessageDigest {
        match self {
            KeyAlgorithm::Ed25519 => MessageDigest::null(),
            _ => MessageDigest::sha256(),
        }
    }
}

/// A named key holder that can appear as subject or issuer.
pub struct Party {
    pub common_name: String,
    pub algorithm: KeyAlgorithm,
    pub key: PKey<Private>,
}

impl Party {
    pub fn new(common_name: &str, algorithm: KeyAlgorithm) -> Self {
        Self {
            common_name: common_name.to_string(),
            algorithm,
            key: algorithm.generate(),
        }
    }

    /// The name as the engine renders it after decoding.
    pub fn dn(&self) -> pkd::DistinguishedName {
        pkd::DistinguishedName::new(format!("C=DE, CN={}", self.common_name))
    }

    fn x509_name(&self) -> X509Name {
        let mut name = X509NameBuilder::new().expect("name builder");
        name.append_entry_by_text("C", "DE").expect("country");
        name.append_entry_by_text("CN", &self.common_name).expect("common name");
        name.build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Usage {
    Authority,
    Leaf,
    Absent,
}

/// Knobs for one generated certificate. Validity is in days relative to now.
#[derive(Debug, Clone)]
pub struct CertSpec {
    pub serial: u32,
    pub valid_from_days: i64,
    pub valid_to_days: i64,
    pub ca: bool,
    pub usage: Usage,
    pub crl_distribution_point: Option<String>,
    pub malformed_distribution_points: bool,
}

impl CertSpec {
    pub fn authority(serial: u32) -> Self {
        Self {
            serial,
            valid_from_days: -365,
            valid_to_days: 3650,
            ca: true,
            usage: Usage::Authority,
            crl_distribution_point: None,
            malformed_distribution_points: false,
        }
    }

    pub fn leaf(serial: u32) -> Self {
        Self {
            serial,
            valid_from_days: -30,
            valid_to_days: 365,
            ca: false,
            usage: Usage::Leaf,
            crl_distribution_point: None,
            malformed_distribution_points: false,
        }
    }

    pub fn valid(mut self, from_days: i64, to_days: i64) -> Self {
        self.valid_from_days = from_days;
        self.valid_to_days = to_days;
        self
    }

    pub fn ca(mut self, ca: bool) -> Self {
        self.ca = ca;
        self
    }

    pub fn usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn distribution_point(mut self, uri: &str) -> Self {
        self.crl_distribution_point = Some(uri.to_string());
        self
    }

    pub fn malformed_distribution_points(mut self) -> Self {
        self.malformed_distribution_points = true;
        self
    }
}

/// DER certificate for `subject`, signed by `issuer`'s key under `issuer`'s name.
pub fn issue(spec: &CertSpec, subject: &Party, issuer: &Party) -> Vec<u8> {
    let mut builder = X509Builder::new().expect("x509 builder");
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(spec.serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&subject.x509_name()).unwrap();
    builder.set_issuer_name(&issuer.x509_name()).unwrap();
    builder.set_pubkey(&subject.key).unwrap();

    let now = chrono::Utc::now().timestamp();
    let not_before = Asn1Time::from_unix(now + spec.valid_from_days * DAY).unwrap();
    let not_after = Asn1Time::from_unix(now + spec.valid_to_days * DAY).unwrap();
    builder.set_not_before(&not_before).unwrap();
    builder.set_not_after(&not_after).unwrap();

    let mut constraints = BasicConstraints::new();
    constraints.critical();
    if spec.ca {
        constraints.ca();
    }
    builder.append_extension(constraints.build().unwrap()).unwrap();

    match spec.usage {
        Usage::Authority => {
            let ku = KeyUsage::new().critical().key_cert_sign().crl_sign().build().unwrap();
            builder.append_extension(ku).unwrap();
        }
        Usage::Leaf => {
            let ku = KeyUsage::new().critical().digital_signature().build().unwrap();
            builder.append_extension(ku).unwrap();
        }
        Usage::Absent => {}
    }

    if let Some(uri) = &spec.crl_distribution_point {
        let cdp = {
            let ctx = builder.x509v3_context(None, None);
            #[allow(deprecated)]
            X509Extension::new_nid(None, Some(&ctx), Nid::CRL_DISTRIBUTION_POINTS, &format!("URI:{uri}")).unwrap()
        };
        builder.append_extension(cdp).unwrap();
    }

    if spec.malformed_distribution_points {
        // OCTET STRING where a SEQUENCE of distribution points is expected
        let oid = Asn1Object::from_str("2.5.29.31").unwrap();
        let contents = Asn1OctetString::new_from_bytes(&[0x04, 0x00]).unwrap();
        let ext = X509Extension::new_from_der(&oid, false, &contents).unwrap();
        builder.append_extension(ext).unwrap();
    }

    builder.sign(&issuer.key, issuer.algorithm.digest()).expect("sign");
    builder.build().to_der().expect("der")
}

pub fn self_signed(spec: &CertSpec, party: &Party) -> Vec<u8> {
    issue(spec, party, party)
}

pub fn decode(der: &[u8], kind: pkd::CertificateType) -> pkd::Certificate {
    pkd::Certificate::from_der(der, kind).expect("decode certificate")
}

/// Flip one bit in the last byte, which sits inside the signature value.
pub fn tamper(der: &[u8]) -> Vec<u8> {
    let mut out = der.to_vec();
    let last = out.len() - 1;
    out[last] ^= 0x01;
    out
}

/// Root -> intermediate -> leaf, all with the same key algorithm.
/// Serials: root 0x64, intermediate 0xC8, leaf 0x01.
pub struct Chain {
    pub root_party: Party,
    pub intermediate_party: Party,
    pub leaf_party: Party,
    pub root: pkd::Certificate,
    pub intermediate: pkd::Certificate,
    pub leaf: pkd::Certificate,
}

impl Chain {
    pub fn generate(algorithm: KeyAlgorithm) -> Self {
        let root_party = Party::new("CSCA", algorithm);
        let intermediate_party = Party::new("CSCA Link", algorithm);
        let leaf_party = Party::new("Document Signer", algorithm);

        let root = self_signed(&CertSpec::authority(100), &root_party);
        let intermediate = issue(&CertSpec::authority(200), &intermediate_party, &root_party);
        let leaf = issue(
            &CertSpec::leaf(1).distribution_point("http://pkd.example.org/csca-link.crl"),
            &leaf_party,
            &intermediate_party,
        );

        Self {
            root: decode(&root, pkd::CertificateType::RootAuthority),
            intermediate: decode(&intermediate, pkd::CertificateType::IntermediateSigner),
            leaf: decode(&leaf, pkd::CertificateType::LeafSigner),
            root_party,
            intermediate_party,
            leaf_party,
        }
    }

    /// Leaf issued by the chain's intermediate with a custom profile.
    pub fn issue_leaf(&self, spec: &CertSpec, kind: pkd::CertificateType) -> pkd::Certificate {
        let party = Party::new("Document Signer", self.leaf_party.algorithm);
        decode(&issue(spec, &party, &self.intermediate_party), kind)
    }

    pub fn store(&self) -> pkd::InMemoryCertificateStore {
        [self.root.clone(), self.intermediate.clone(), self.leaf.clone()]
            .into_iter()
            .collect()
    }
}

/// ECDSA P-256 root -> intermediate -> leaf generated with rcgen.
pub fn rcgen_chain() -> (pkd::Certificate, pkd::Certificate, pkd::Certificate) {
    let root = rcgen::Certificate::from_params(rcgen_params("Test CSCA", true)).expect("root");
    let intermediate = rcgen::Certificate::from_params(rcgen_params("Test Link", true)).expect("intermediate");
    let leaf = rcgen::Certificate::from_params(rcgen_params("Test DS", false)).expect("leaf");

    let root_der = root.serialize_der().expect("root der");
    let intermediate_der = intermediate.serialize_der_with_signer(&root).expect("intermediate der");
    let leaf_der = leaf.serialize_der_with_signer(&intermediate).expect("leaf der");

    (
        decode(&root_der, pkd::CertificateType::RootAuthority),
        decode(&intermediate_der, pkd::CertificateType::IntermediateSigner),
        decode(&leaf_der, pkd::CertificateType::LeafSigner),
    )
}

fn rcgen_params(common_name: &str, ca: bool) -> rcgen::CertificateParams {
    let mut params = rcgen::CertificateParams::new(vec![]);
    params.alg = &rcgen::PKCS_ECDSA_P256_SHA256;
    params.distinguished_name = rcgen::DistinguishedName::new();
    params.distinguished_name.push(rcgen::DnType::CountryName, "DE");
    params.distinguished_name.push(rcgen::DnType::CommonName, common_name);
    if ca {
        params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        params.key_usages = vec![rcgen::KeyUsagePurpose::KeyCertSign, rcgen::KeyUsagePurpose::CrlSign];
    } else {
        // With `NoCa` and no SANs rcgen writes no extensions at all, key usage included.
        params.is_ca = rcgen::IsCa::ExplicitNoCa;
        params.key_usages = vec![rcgen::KeyUsagePurpose::DigitalSignature];
    }
    params
}

/// A CRL for `issuer` valid from yesterday for `valid_days`, listing `serials`.
pub fn crl(issuer: &pkd::DistinguishedName, valid_days: i64, serials: &[&str]) -> pkd::CertificateRevocationList {
    let now = chrono::Utc::now();
    pkd::CertificateRevocationList::new(
        issuer.clone(),
        now - chrono::Duration::days(1),
        Some(now + chrono::Duration::days(valid_days)),
        serials.iter().map(|s| s.parse().expect("serial")),
    )
}

pub fn pinned_config(at: chrono::DateTime<chrono::Utc>) -> pkd::ValidationConfig {
    pkd::ValidationConfig {
        validation_time: Some(at),
        ..pkd::ValidationConfig::secure_default()
    }
}

//! Certificate signature verification.
//! Dispatches on the certificate's signature algorithm OID; OpenSSL does the math.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey, Public};
use openssl::sign::Verifier;
use openssl::x509::X509;
use tracing::debug;

use crate::domain::types::Certificate;

/// Digest paired with RSA PKCS#1 v1.5, DSA and ECDSA signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digest {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl Digest {
    fn message_digest(self) -> MessageDigest {
        match self {
            Digest::Sha1 => MessageDigest::sha1(),
            Digest::Sha224 => MessageDigest::sha224(),
            Digest::Sha256 => MessageDigest::sha256(),
            Digest::Sha384 => MessageDigest::sha384(),
            Digest::Sha512 => MessageDigest::sha512(),
        }
    }
}

/// Signature algorithms the verifier understands. New algorithms are new
/// variants plus an OID entry; callers never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    RsaPkcs1(Digest),
    /// RSASSA-PSS; digest and salt come from the parameters in the certificate.
    RsaPss,
    Dsa(Digest),
    Ecdsa(Digest),
    Ed25519,
}

static SIGNATURE_OIDS: Lazy<HashMap<&'static str, SignatureAlgorithm>> = Lazy::new(|| {
    use Digest::*;
    use SignatureAlgorithm::*;
    HashMap::from([
        ("1.2.840.113549.1.1.5", RsaPkcs1(Sha1)),
        ("1.2.840.113549.1.1.14", RsaPkcs1(Sha224)),
        ("1.2.840.113549.1.1.11", RsaPkcs1(Sha256)),
        ("1.2.840.113549.1.1.12", RsaPkcs1(Sha384)),
        ("1.2.840.113549.1.1.13", RsaPkcs1(Sha512)),
        ("1.2.840.113549.1.1.10", RsaPss),
        ("1.2.840.10040.4.3", Dsa(Sha1)),
        ("2.16.840.1.101.3.4.3.1", Dsa(Sha224)),
        ("2.16.840.1.101.3.4.3.2", Dsa(Sha256)),
        ("2.16.840.1.101.3.4.3.3", Dsa(Sha384)),
        ("2.16.840.1.101.3.4.3.4", Dsa(Sha512)),
        ("1.2.840.10045.4.1", Ecdsa(Sha1)),
        ("1.2.840.10045.4.3.1", Ecdsa(Sha224)),
        ("1.2.840.10045.4.3.2", Ecdsa(Sha256)),
        ("1.2.840.10045.4.3.3", Ecdsa(Sha384)),
        ("1.2.840.10045.4.3.4", Ecdsa(Sha512)),
        ("1.3.101.112", Ed25519),
    ])
});

impl SignatureAlgorithm {
    /// Look up a dotted signature algorithm OID.
    pub fn from_oid(oid: &str) -> Option<Self> {
        SIGNATURE_OIDS.get(oid).copied()
    }

    /// Whether a key of type `id` can carry this algorithm. RSASSA-PSS
    /// accepts both rsaEncryption and id-RSASSA-PSS keys.
    fn accepts_key(self, id: Id) -> bool {
        match self {
            SignatureAlgorithm::RsaPkcs1(_) => id == Id::RSA,
            SignatureAlgorithm::RsaPss => id == Id::RSA || id == Id::RSA_PSS,
            SignatureAlgorithm::Dsa(_) => id == Id::DSA,
            SignatureAlgorithm::Ecdsa(_) => id == Id::EC,
            SignatureAlgorithm::Ed25519 => id == Id::ED25519,
        }
    }

    fn verify(self, subject: &Certificate, key: &PKey<Public>) -> Result<bool, ErrorStack> {
        match self {
            SignatureAlgorithm::RsaPkcs1(digest)
            | SignatureAlgorithm::Dsa(digest)
            | SignatureAlgorithm::Ecdsa(digest) => {
                let mut verifier = Verifier::new(digest.message_digest(), key)?;
                verifier.update(subject.signed_data())?;
                verifier.verify(subject.signature())
            }
            SignatureAlgorithm::Ed25519 => {
                let mut verifier = Verifier::new_without_digest(key)?;
                verifier.verify_oneshot(subject.signature(), subject.signed_data())
            }
            SignatureAlgorithm::RsaPss => X509::from_der(subject.raw())?.verify(key),
        }
    }
}

/// True when `subject`'s signature was produced by the holder of
/// `issuer_public_key` (DER `SubjectPublicKeyInfo`).
///
/// Fails closed: decode errors, unsupported algorithms, key-type mismatches
/// and bad signatures all return `false`.
pub fn verify_signature(subject: &Certificate, issuer_public_key: &[u8]) -> bool {
    let Some(algorithm) = SignatureAlgorithm::from_oid(subject.signature_algorithm()) else {
        debug!(
            subject = %subject.subject(),
            oid = subject.signature_algorithm(),
            "unsupported signature algorithm"
        );
        return false;
    };

    let key = match PKey::public_key_from_der(issuer_public_key) {
        Ok(key) => key,
        Err(e) => {
            debug!(subject = %subject.subject(), error = %e, "issuer public key does not decode");
            return false;
        }
    };

    if !algorithm.accepts_key(key.id()) {
        debug!(
            subject = %subject.subject(),
            ?algorithm,
            key = ?key.id(),
            "issuer key type does not match signature algorithm"
        );
        return false;
    }

    match algorithm.verify(subject, &key) {
        Ok(valid) => {
            if !valid {
                debug!(subject = %subject.subject(), ?algorithm, "signature mismatch");
            }
            valid
        }
        Err(e) => {
            debug!(subject = %subject.subject(), ?algorithm, error = %e, "signature check failed");
            false
        }
    }
}

/// Verify a certificate against its own embedded key.
pub fn verify_self_signature(cert: &Certificate) -> bool {
    verify_signature(cert, cert.public_key())
}

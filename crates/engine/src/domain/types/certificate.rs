use chrono::{DateTime, Utc};
use x509_parser::prelude::*;

use super::core::{CertificateType, DistinguishedName, SerialNumber};
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::verify::ValidationResult;

/// A certificate as handed over by ingestion.
///
/// Everything except the attached validation result is fixed at construction;
/// the validator only reads it.
#[derive(Debug, Clone)]
pub struct Certificate {
    subject: DistinguishedName,
    issuer: DistinguishedName,
    serial_number: SerialNumber,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    raw: Vec<u8>,
    fingerprint: String,
    kind: CertificateType,
    public_key: Vec<u8>,
    signature_algorithm: String,
    signed_data: Vec<u8>,
    signature: Vec<u8>,
    validation_result: Option<ValidationResult>,
}

impl Certificate {
    /// Decode a DER certificate and tag it with its declared type.
    pub fn from_der(der: &[u8], kind: CertificateType) -> EngineResult<Self> {
        let (rest, cert) = parse_x509_certificate(der)
            .map_err(|e| EngineError::Decode(format!("certificate: {e}")))?;
        if !rest.is_empty() {
            return Err(EngineError::Decode(format!(
                "certificate: {} trailing bytes",
                rest.len()
            )));
        }

        let tbs = &cert.tbs_certificate;
        Ok(Self {
            subject: DistinguishedName::new(tbs.subject.to_string()),
            issuer: DistinguishedName::new(tbs.issuer.to_string()),
            serial_number: SerialNumber::from_bytes(tbs.raw_serial()),
            not_before: asn1_to_utc(&tbs.validity.not_before)?,
            not_after: asn1_to_utc(&tbs.validity.not_after)?,
            raw: der.to_vec(),
            fingerprint: fingerprint(der),
            kind,
            public_key: tbs.subject_pki.raw.to_vec(),
            signature_algorithm: cert.signature_algorithm.algorithm.to_id_string(),
            signed_data: tbs.as_ref().to_vec(),
            signature: cert.signature_value.data.to_vec(),
            validation_result: None,
        })
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Raw DER encoding.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Upper-case hex SHA-256 of the DER encoding; the certificate identity.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn kind(&self) -> CertificateType {
        self.kind
    }

    /// DER `SubjectPublicKeyInfo`.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Dotted OID of the outer signature algorithm.
    pub fn signature_algorithm(&self) -> &str {
        &self.signature_algorithm
    }

    /// The TBS bytes the issuer signed.
    pub fn signed_data(&self) -> &[u8] {
        &self.signed_data
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Subject and issuer names are equal. Says nothing about the signature.
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }

    /// `not_before <= at <= not_after`
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    pub fn validation_result(&self) -> Option<&ValidationResult> {
        self.validation_result.as_ref()
    }

    /// Record the latest result against this certificate. The validator never
    /// calls this itself; callers decide whether to keep the outcome.
    pub fn attach_validation_result(&mut self, result: ValidationResult) {
        self.validation_result = Some(result);
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for Certificate {}

pub(crate) fn asn1_to_utc(t: &ASN1Time) -> EngineResult<DateTime<Utc>> {
    DateTime::from_timestamp(t.timestamp(), 0)
        .ok_or_else(|| EngineError::Decode(format!("time out of range: {}", t.timestamp())))
}

pub(crate) fn fingerprint(der: &[u8]) -> String {
    hex::encode_upper(openssl::sha::sha256(der))
}

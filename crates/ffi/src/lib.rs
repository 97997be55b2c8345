use std::sync::Arc;

use chrono::{DateTime, Utc};
use pkd_engine as pkd;
use pkd_engine::domain::error::EngineError;

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("{message}")]
    Generic { message: String },
}

impl From<EngineError> for FfiError {
    fn from(e: EngineError) -> Self {
        FfiError::Generic {
            message: e.to_string(),
        }
    }
}

impl From<anyhow::Error> for FfiError {
    fn from(e: anyhow::Error) -> Self {
        FfiError::Generic {
            message: format!("{e:#}"),
        }
    }
}

// ===== FFI types mirroring the public Rust API (FFI-friendly) =====

#[derive(uniffi::Enum, Debug, Clone, Copy)]
pub enum FfiCertificateType { RootAuthority, IntermediateSigner, LeafSigner, Unknown }

impl From<FfiCertificateType> for pkd::CertificateType {
    fn from(v: FfiCertificateType) -> Self {
        match v {
            FfiCertificateType::RootAuthority => pkd::CertificateType::RootAuthority,
            FfiCertificateType::IntermediateSigner => pkd::CertificateType::IntermediateSigner,
            FfiCertificateType::LeafSigner => pkd::CertificateType::LeafSigner,
            FfiCertificateType::Unknown => pkd::CertificateType::Unknown,
        }
    }
}

#[derive(uniffi::Enum, Debug, Clone, Copy)]
pub enum FfiRevocationScope { LeafOnly, FullPath }

impl From<FfiRevocationScope> for pkd::RevocationScope {
    fn from(v: FfiRevocationScope) -> Self {
        match v { FfiRevocationScope::LeafOnly => pkd::RevocationScope::LeafOnly, FfiRevocationScope::FullPath => pkd::RevocationScope::FullPath }
    }
}

impl From<pkd::RevocationScope> for FfiRevocationScope {
    fn from(v: pkd::RevocationScope) -> Self {
        match v { pkd::RevocationScope::LeafOnly => FfiRevocationScope::LeafOnly, pkd::RevocationScope::FullPath => FfiRevocationScope::FullPath }
    }
}

/// `validation_time` is unix seconds; `None` uses the wall clock.
#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiValidationConfig {
    pub max_depth: u32,
    pub revocation_scope: FfiRevocationScope,
    pub validation_time: Option<i64>,
}

impl FfiValidationConfig {
    pub fn defaults() -> Self {
        let d = pkd::ValidationConfig::secure_default();
        Self {
            max_depth: d.max_depth as u32,
            revocation_scope: d.revocation_scope.into(),
            validation_time: d.validation_time.map(|t| t.timestamp()),
        }
    }
}

impl TryFrom<FfiValidationConfig> for pkd::ValidationConfig {
    type Error = FfiError;
    fn try_from(v: FfiValidationConfig) -> Result<Self, Self::Error> {
        let validation_time = v
            .validation_time
            .map(|secs| {
                DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| FfiError::Generic {
                    message: format!("validation_time out of range: {secs}"),
                })
            })
            .transpose()?;
        let cfg = pkd::ValidationConfig {
            max_depth: v.max_depth as usize,
            revocation_scope: v.revocation_scope.into(),
            validation_time,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(uniffi::Enum, Debug, Clone, Copy)]
pub enum FfiCertificateStatus { Valid, Expired, NotYetValid, Revoked, Invalid }

#[derive(uniffi::Enum, Debug, Clone, Copy)]
pub enum FfiErrorSeverity { Error, Warning }

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiValidationError {
    /// Stable code, e.g. `SIGNATURE_INVALID`.
    pub code: String,
    pub category: String,
    pub severity: FfiErrorSeverity,
    pub subject: String,
    pub message: String,
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiValidationResult {
    pub status: FfiCertificateStatus,
    pub signature_valid: Option<bool>,
    pub chain_valid: Option<bool>,
    pub not_revoked: Option<bool>,
    pub validity_valid: Option<bool>,
    pub constraints_valid: Option<bool>,
    pub errors: Vec<FfiValidationError>,
    pub trust_path: Vec<String>,
    pub validated_at: i64,
    pub elapsed_ms: u64,
}

// serde names are the wire names callers already see in JSON output
fn wire_name<T: serde::Serialize>(v: &T) -> String {
    serde_json::to_value(v)
        .ok()
        .and_then(|j| j.as_str().map(str::to_string))
        .unwrap_or_default()
}

impl From<pkd::ValidationError> for FfiValidationError {
    fn from(e: pkd::ValidationError) -> Self {
        FfiValidationError {
            code: wire_name(&e.code),
            category: wire_name(&e.category),
            severity: match e.severity { pkd::ErrorSeverity::Error => FfiErrorSeverity::Error, pkd::ErrorSeverity::Warning => FfiErrorSeverity::Warning },
            subject: e.subject.to_string(),
            message: e.message,
        }
    }
}

impl From<pkd::ValidationResult> for FfiValidationResult {
    fn from(v: pkd::ValidationResult) -> Self {
        FfiValidationResult {
            status: match v.status {
                pkd::CertificateStatus::Valid => FfiCertificateStatus::Valid,
                pkd::CertificateStatus::Expired => FfiCertificateStatus::Expired,
                pkd::CertificateStatus::NotYetValid => FfiCertificateStatus::NotYetValid,
                pkd::CertificateStatus::Revoked => FfiCertificateStatus::Revoked,
                pkd::CertificateStatus::Invalid => FfiCertificateStatus::Invalid,
            },
            signature_valid: v.signature_valid,
            chain_valid: v.chain_valid,
            not_revoked: v.not_revoked,
            validity_valid: v.validity_valid,
            constraints_valid: v.constraints_valid,
            errors: v.errors.into_iter().map(FfiValidationError::from).collect(),
            trust_path: v.trust_path.iter().map(ToString::to_string).collect(),
            validated_at: v.validated_at.timestamp(),
            elapsed_ms: v.elapsed.as_millis() as u64,
        }
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiPathEntry {
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub fingerprint: String,
}

impl From<pkd::Certificate> for FfiPathEntry {
    fn from(c: pkd::Certificate) -> Self {
        FfiPathEntry {
            subject: c.subject().to_string(),
            issuer: c.issuer().to_string(),
            serial_number: c.serial_number().to_string(),
            fingerprint: c.fingerprint().to_string(),
        }
    }
}

// ===== Trust store object =====

/// Certificates and CRLs held in memory for the lifetime of the handle.
#[derive(uniffi::Object, Default)]
pub struct FfiTrustStore {
    certificates: pkd::InMemoryCertificateStore,
    crls: pkd::InMemoryCrlStore,
}

#[uniffi::export]
impl FfiTrustStore {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a DER certificate with its declared type. Returns the fingerprint.
    pub fn add_certificate(&self, der: Vec<u8>, kind: FfiCertificateType) -> Result<String, FfiError> {
        let cert = pkd::Certificate::from_der(&der, kind.into())?;
        let fingerprint = cert.fingerprint().to_string();
        self.certificates.insert(cert)?;
        Ok(fingerprint)
    }

    /// Add a DER CRL. Returns `false` when a newer list for the issuer is already held.
    pub fn add_crl(&self, der: Vec<u8>) -> Result<bool, FfiError> {
        let crl = pkd::CertificateRevocationList::from_der(&der)?;
        Ok(self.crls.insert(crl)?)
    }

    pub fn certificate_count(&self) -> u64 {
        self.certificates.len() as u64
    }

    pub fn validate(
        &self,
        der: Vec<u8>,
        kind: FfiCertificateType,
        check_revocation: Option<bool>,
        config: Option<FfiValidationConfig>,
    ) -> Result<FfiValidationResult, FfiError> {
        let target = pkd::Certificate::from_der(&der, kind.into())?;
        let cfg = match config {
            Some(c) => c.try_into()?,
            None => pkd::ValidationConfig::secure_default(),
        };
        let check_revocation = check_revocation.unwrap_or(pkd::ValidatorDefaults::CHECK_REVOCATION);
        let result = pkd::validate(&target, &self.certificates, &self.crls, &cfg, check_revocation)?;
        Ok(result.into())
    }

    /// Anchor-first chain for the certificate, without validating it.
    pub fn build_path(&self, der: Vec<u8>, kind: FfiCertificateType, max_depth: u32) -> Result<Vec<FfiPathEntry>, FfiError> {
        let target = pkd::Certificate::from_der(&der, kind.into())?;
        let path = pkd::build_path(&target, &self.certificates, max_depth as usize)?;
        Ok(path.into_certificates().into_iter().map(FfiPathEntry::from).collect())
    }
}

// ===== Free functions =====

#[uniffi::export]
pub fn validation_config_defaults() -> FfiValidationConfig {
    FfiValidationConfig::defaults()
}

uniffi::setup_scaffolding!();

// crates/engine/src/domain/verify.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::DistinguishedName;

/// Overall classification of a validated certificate.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Valid,
    Expired,
    NotYetValid,
    Revoked,
    Invalid,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Signature,
    Chain,
    Revocation,
    Validity,
    Constraint,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SignatureInvalid,
    NoTrustPath,
    NameChainBroken,
    ConstraintViolation,
    MalformedExtension,
    Expired,
    NotYetValid,
    Revoked,
    CrlUnavailable,
    CrlExpired,
    RevocationLookupFailed,
}

impl ErrorCode {
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::SignatureInvalid => ErrorCategory::Signature,
            ErrorCode::NoTrustPath | ErrorCode::NameChainBroken => ErrorCategory::Chain,
            ErrorCode::ConstraintViolation | ErrorCode::MalformedExtension => ErrorCategory::Constraint,
            ErrorCode::Expired | ErrorCode::NotYetValid => ErrorCategory::Validity,
            ErrorCode::Revoked
            | ErrorCode::CrlUnavailable
            | ErrorCode::CrlExpired
            | ErrorCode::RevocationLookupFailed => ErrorCategory::Revocation,
        }
    }
}

/// One finding from a validation pass, located at the certificate it concerns.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    pub severity: ErrorSeverity,
    pub category: ErrorCategory,
    pub subject: DistinguishedName,
}

impl ValidationError {
    pub fn error(code: ErrorCode, subject: &DistinguishedName, message: impl Into<String>) -> Self {
        Self::with_severity(code, ErrorSeverity::Error, subject, message)
    }

    pub fn warning(code: ErrorCode, subject: &DistinguishedName, message: impl Into<String>) -> Self {
        Self::with_severity(code, ErrorSeverity::Warning, subject, message)
    }

    fn with_severity(
        code: ErrorCode,
        severity: ErrorSeverity,
        subject: &DistinguishedName,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            severity,
            category: code.category(),
            subject: subject.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == ErrorSeverity::Error
    }
}

/// Outcome of validating one certificate. Sub-results are `None` when the
/// corresponding check was not evaluated.
#[derive(Debug, Serialize, Clone)]
pub struct ValidationResult {
    pub status: CertificateStatus,
    pub signature_valid: Option<bool>,
    pub chain_valid: Option<bool>,
    pub not_revoked: Option<bool>,
    pub validity_valid: Option<bool>,
    pub constraints_valid: Option<bool>,
    pub errors: Vec<ValidationError>,
    /// Subject names from anchor to target; empty when no path was found.
    pub trust_path: Vec<DistinguishedName>,
    pub validated_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ValidationResult {
    pub(crate) fn new(validated_at: DateTime<Utc>) -> Self {
        Self {
            status: CertificateStatus::Invalid,
            signature_valid: None,
            chain_valid: None,
            not_revoked: None,
            validity_valid: None,
            constraints_valid: None,
            errors: Vec::new(),
            trust_path: Vec::new(),
            validated_at,
            elapsed: Duration::ZERO,
        }
    }

    /// Derive `status` from the sub-results and error codes.
    /// Priority: revoked, then expired / not-yet-valid, then invalid.
    pub(crate) fn classify(&mut self) {
        let failed = |v: Option<bool>| v == Some(false);
        let has = |code| self.errors.iter().any(|e| e.is_error() && e.code == code);

        self.status = if failed(self.not_revoked) {
            CertificateStatus::Revoked
        } else if has(ErrorCode::Expired) {
            CertificateStatus::Expired
        } else if has(ErrorCode::NotYetValid) {
            CertificateStatus::NotYetValid
        } else if failed(self.signature_valid)
            || failed(self.chain_valid)
            || failed(self.constraints_valid)
            || failed(self.validity_valid)
        {
            CertificateStatus::Invalid
        } else {
            CertificateStatus::Valid
        };
    }

    pub fn is_valid(&self) -> bool {
        self.status == CertificateStatus::Valid
    }

    pub fn errors_in(&self, category: ErrorCategory) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.category == category)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// The five sub-results in a fixed order, for comparing runs.
    pub fn sub_results(&self) -> [Option<bool>; 5] {
        [
            self.signature_valid,
            self.chain_valid,
            self.not_revoked,
            self.validity_valid,
            self.constraints_valid,
        ]
    }
}

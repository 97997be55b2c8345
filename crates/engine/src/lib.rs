// crates/engine/src/lib.rs

//! Public facade for the PKD trust engine.
//! Exposes a stable API and re-exports types for consumers (ingestion, FFI).

pub mod adapters;
pub mod crypto;
pub mod domain;
pub mod validation;


/// Validate `target` against the given stores.
/// Internally builds a `CertificateValidator` for this one call.
pub fn validate(
    target: &Certificate,
    certificates: &dyn CertificateLookup,
    crls: &dyn CrlLookup,
    config: &ValidationConfig,
    check_revocation: bool,
) -> EngineResult<ValidationResult> {
    CertificateValidator::new(certificates, crls, config.clone())?.validate(target, check_revocation)
}

/// Build the anchor-to-target chain without validating it (display, audit).
pub fn build_path(
    target: &Certificate,
    certificates: &dyn CertificateLookup,
    max_depth: usize,
) -> EngineResult<TrustPath> {
    Ok(PathBuilder::new(certificates, max_depth)?.build(target)?)
}

// Re-exports for convenience
pub use adapters::{InMemoryCertificateStore, InMemoryCrlStore};
pub use crypto::{read_extensions, verify_signature, CertificateExtensions, KeyUsage, SignatureAlgorithm};
pub use domain::error::{EngineError, EngineResult, PathNotFound};
pub use domain::lookup::{CertificateLookup, CrlLookup};
pub use domain::types::{
    Certificate, CertificateRevocationList, CertificateType, DistinguishedName, RevocationScope,
    SerialNumber, TrustPath, ValidationConfig, ValidatorDefaults,
};
pub use domain::verify::{
    CertificateStatus, ErrorCategory, ErrorCode, ErrorSeverity, ValidationError, ValidationResult,
};
pub use validation::{CertificateValidator, ChainValidator, PathBuilder, RevocationChecker, RevocationStatus};

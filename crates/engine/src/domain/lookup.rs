// crates/engine/src/domain/lookup.rs

use anyhow::Result;

use super::types::{Certificate, CertificateRevocationList, DistinguishedName};

/// Certificate source used by the path builder (storage, PKD mirror, ...).
///
/// Implementations must tolerate concurrent reads; the engine never writes.
pub trait CertificateLookup: Send + Sync {
    /// Every stored certificate whose subject equals `name`, in one call.
    /// An `Err` is treated as "not found" for this validation.
    fn find_by_subject_name(&self, name: &DistinguishedName) -> Result<Vec<Certificate>>;
}

/// CRL source used by the revocation checker.
pub trait CrlLookup: Send + Sync {
    fn find_by_issuer(&self, issuer: &DistinguishedName) -> Result<Option<CertificateRevocationList>>;
}

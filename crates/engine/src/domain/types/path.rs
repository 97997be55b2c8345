use std::collections::HashSet;

use super::certificate::Certificate;
use crate::domain::error::{EngineError, EngineResult};

/// Certificates from trust anchor (index 0) to target (last).
///
/// Invariants: non-empty, no repeated fingerprint, each certificate's issuer
/// name equals the subject name of the one before it. Names only; signatures
/// are the chain validator's job.
#[derive(Debug, Clone)]
pub struct TrustPath {
    certificates: Vec<Certificate>,
}

impl TrustPath {
    /// Used by the path builder, which upholds the invariants while searching.
    pub(crate) fn new_unchecked(certificates: Vec<Certificate>) -> Self {
        debug_assert!(!certificates.is_empty());
        Self { certificates }
    }

    /// Build a path from caller-supplied certificates, anchor first.
    pub fn from_certificates(certificates: Vec<Certificate>, max_depth: usize) -> EngineResult<Self> {
        if certificates.is_empty() {
            return Err(EngineError::InvalidArgument("trust path is empty".into()));
        }
        if certificates.len() > max_depth {
            return Err(EngineError::InvalidArgument(format!(
                "trust path has {} certificates, max depth is {max_depth}",
                certificates.len()
            )));
        }

        let mut seen = HashSet::new();
        for cert in &certificates {
            if !seen.insert(cert.fingerprint()) {
                return Err(EngineError::InvalidArgument(format!(
                    "certificate '{}' appears twice in the trust path",
                    cert.subject()
                )));
            }
        }

        for pair in certificates.windows(2) {
            if pair[1].issuer() != pair[0].subject() {
                return Err(EngineError::InvalidArgument(format!(
                    "'{}' is not issued by '{}'",
                    pair[1].subject(),
                    pair[0].subject()
                )));
            }
        }

        Ok(Self { certificates })
    }

    pub fn anchor(&self) -> &Certificate {
        &self.certificates[0]
    }

    pub fn target(&self) -> &Certificate {
        &self.certificates[self.certificates.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// `(issuer, subject)` pairs, starting with the anchor paired with itself.
    /// A length-1 path therefore still has one link to evaluate.
    pub fn links(&self) -> impl Iterator<Item = (&Certificate, &Certificate)> {
        std::iter::once((self.anchor(), self.anchor())).chain(
            self.certificates
                .windows(2)
                .map(|pair| (&pair[0], &pair[1])),
        )
    }

    pub fn into_certificates(self) -> Vec<Certificate> {
        self.certificates
    }
}

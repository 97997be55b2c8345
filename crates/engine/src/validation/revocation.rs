// validation/revocation.rs
//
// Fail-Open: missing, stale or unreadable CRL data never marks a certificate
// revoked. Each such outcome is logged at warn level and returned as a
// `Degradation`. Switching to fail-closed requires a product decision.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::crypto::read_extensions;
use crate::domain::lookup::CrlLookup;
use crate::domain::types::Certificate;
use crate::domain::verify::{ErrorCode, ValidationError};

/// Why a revocation check could not give an authoritative answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
  NoCrl,
  CrlExpired { next_update: DateTime<Utc> },
  LookupFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationStatus {
  Revoked,
  NotRevoked,
  /// Treated as not revoked.
  Unknown(Degradation),
}

impl RevocationStatus {
  pub fn is_revoked(&self) -> bool {
    matches!(self, RevocationStatus::Revoked)
  }

  /// Error entry for a revoked certificate, warning for a degraded check.
  pub fn to_validation_error(&self, cert: &Certificate) -> Option<ValidationError> {
    let subject = cert.subject();
    match self {
      RevocationStatus::NotRevoked => None,
      RevocationStatus::Revoked => Some(ValidationError::error(
        ErrorCode::Revoked,
        subject,
        format!("serial {} is listed on the CRL of '{}'", cert.serial_number(), cert.issuer()),
      )),
      RevocationStatus::Unknown(Degradation::NoCrl) => Some(ValidationError::warning(
        ErrorCode::CrlUnavailable,
        subject,
        format!("no CRL available for '{}', assumed not revoked", cert.issuer()),
      )),
      RevocationStatus::Unknown(Degradation::CrlExpired { next_update }) => Some(ValidationError::warning(
        ErrorCode::CrlExpired,
        subject,
        format!("CRL of '{}' expired at {}, assumed not revoked", cert.issuer(), next_update.to_rfc3339()),
      )),
      RevocationStatus::Unknown(Degradation::LookupFailed(reason)) => Some(ValidationError::warning(
        ErrorCode::RevocationLookupFailed,
        subject,
        format!("CRL lookup failed ({reason}), assumed not revoked"),
      )),
    }
  }
}

/// Looks certificates up on the locally held CRL of their issuer.
pub struct RevocationChecker<'a> {
  lookup: &'a dyn CrlLookup,
  at: DateTime<Utc>,
}

impl<'a> RevocationChecker<'a> {
  pub fn new(lookup: &'a dyn CrlLookup, at: DateTime<Utc>) -> Self {
    Self { lookup, at }
  }

  pub fn is_revoked(&self, cert: &Certificate) -> bool {
    self.check(cert).is_revoked()
  }

  pub fn check(&self, cert: &Certificate) -> RevocationStatus {
    let issuer = cert.issuer();
    let found = catch_unwind(AssertUnwindSafe(|| self.lookup.find_by_issuer(issuer)));

    let crl = match found {
      Ok(Ok(Some(crl))) => crl,
      Ok(Ok(None)) => {
        let distribution_points = read_extensions(cert).crl_distribution_points;
        warn!(
          subject = %cert.subject(),
          issuer = %issuer,
          ?distribution_points,
          "no CRL for issuer, assuming not revoked"
        );
        return RevocationStatus::Unknown(Degradation::NoCrl);
      }
      Ok(Err(e)) => {
        warn!(subject = %cert.subject(), issuer = %issuer, error = %e, "CRL lookup failed, assuming not revoked");
        return RevocationStatus::Unknown(Degradation::LookupFailed(e.to_string()));
      }
      Err(_) => {
        warn!(subject = %cert.subject(), issuer = %issuer, "CRL lookup panicked, assuming not revoked");
        return RevocationStatus::Unknown(Degradation::LookupFailed("lookup panicked".into()));
      }
    };

    if let Some(next_update) = crl.next_update().filter(|_| crl.is_expired_at(self.at)) {
      warn!(
        subject = %cert.subject(),
        issuer = %issuer,
        next_update = %next_update,
        "CRL expired, assuming not revoked"
      );
      return RevocationStatus::Unknown(Degradation::CrlExpired { next_update });
    }

    if crl.contains(cert.serial_number()) {
      debug!(subject = %cert.subject(), serial = %cert.serial_number(), "certificate is revoked");
      RevocationStatus::Revoked
    } else {
      RevocationStatus::NotRevoked
    }
  }
}

// validation/mod.rs

use std::time::Instant;

use tracing::info;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::lookup::{CertificateLookup, CrlLookup};
use crate::domain::types::{Certificate, RevocationScope, TrustPath, ValidationConfig};
use crate::domain::verify::{ErrorCode, ValidationError, ValidationResult};

mod chain;
mod path_builder;
mod revocation;

pub use chain::{ChainValidator, LinkOutcome};
pub use path_builder::{is_trust_anchor, select_issuer, PathBuilder};
pub use revocation::{Degradation, RevocationChecker, RevocationStatus};

/// Single entry point: path building, chain checks and revocation for one
/// certificate. Holds no mutable state; share it freely across threads.
pub struct CertificateValidator<'a> {
  certificates: &'a dyn CertificateLookup,
  crls: &'a dyn CrlLookup,
  config: ValidationConfig,
}

impl<'a> CertificateValidator<'a> {
  pub fn new(
    certificates: &'a dyn CertificateLookup,
    crls: &'a dyn CrlLookup,
    config: ValidationConfig,
  ) -> EngineResult<Self> {
    config.validate()?;
    Ok(Self { certificates, crls, config })
  }

  pub fn config(&self) -> &ValidationConfig {
    &self.config
  }

  /// The raw chain for `target`, without validating it. A missing path is
  /// `EngineError::Path`.
  pub fn build_path(&self, target: &Certificate) -> EngineResult<TrustPath> {
    let builder = PathBuilder::new(self.certificates, self.config.max_depth)?;
    Ok(builder.build(target)?)
  }

  /// Validate `target`. "Invalid" is a result value, not an error; `Err` only
  /// signals a contract violation such as a bad configuration.
  pub fn validate(&self, target: &Certificate, check_revocation: bool) -> EngineResult<ValidationResult> {
    let started = Instant::now();
    let now = self.config.now();

    let path = match self.build_path(target) {
      Ok(path) => path,
      Err(EngineError::Path(reason)) => {
        let mut result = ValidationResult::new(now);
        result.chain_valid = Some(false);
        result.errors.push(ValidationError::error(
          ErrorCode::NoTrustPath,
          target.subject(),
          format!("no trust path: {reason}"),
        ));
        result.classify();
        result.elapsed = started.elapsed();
        info!(subject = %target.subject(), status = ?result.status, %reason, "validation finished without trust path");
        return Ok(result);
      }
      Err(e) => return Err(e),
    };

    let mut result = ChainValidator::new(now).validate_chain(&path);

    if check_revocation {
      let checker = RevocationChecker::new(self.crls, now);
      let scope: &[Certificate] = match self.config.revocation_scope {
        RevocationScope::LeafOnly => std::slice::from_ref(path.target()),
        RevocationScope::FullPath => path.certificates(),
      };

      let mut not_revoked = true;
      for cert in scope {
        let status = checker.check(cert);
        not_revoked &= !status.is_revoked();
        result.errors.extend(status.to_validation_error(cert));
      }
      result.not_revoked = Some(not_revoked);
      result.classify();
    }

    result.elapsed = started.elapsed();
    info!(
      subject = %target.subject(),
      status = ?result.status,
      path_length = path.len(),
      elapsed_us = result.elapsed.as_micros() as u64,
      "validation finished"
    );
    Ok(result)
  }
}

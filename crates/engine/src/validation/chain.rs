// validation/chain.rs

use chrono::{DateTime, Utc};

use crate::crypto::{read_extensions, verify_signature, CertificateExtensions, KeyUsage};
use crate::domain::types::{Certificate, CertificateType, TrustPath};
use crate::domain::verify::{ErrorCode, ValidationError, ValidationResult};

/// Results of the independent checks on one `(issuer, subject)` link.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
  pub chained: bool,
  pub signature_valid: bool,
  pub constraints_valid: bool,
  pub validity_valid: bool,
  /// One entry per failed check, plus extension warnings.
  pub errors: Vec<ValidationError>,
}

impl LinkOutcome {
  pub fn passed(&self) -> bool {
    self.chained && self.signature_valid && self.constraints_valid && self.validity_valid
  }
}

/// Checks every link of a trust path at a fixed instant.
pub struct ChainValidator {
  at: DateTime<Utc>,
}

impl ChainValidator {
  pub fn new(at: DateTime<Utc>) -> Self {
    Self { at }
  }

  /// Evaluate one link. Every check runs even when an earlier one failed.
  pub fn validate_link(&self, issuer: &Certificate, subject: &Certificate) -> LinkOutcome {
    let mut errors = Vec::new();
    let name = subject.subject();

    let chained = subject.issuer() == issuer.subject();
    if !chained {
      errors.push(ValidationError::error(
        ErrorCode::NameChainBroken,
        name,
        format!("issuer name '{}' does not match '{}'", subject.issuer(), issuer.subject()),
      ));
    }

    let signature_valid = verify_signature(subject, issuer.public_key());
    if !signature_valid {
      errors.push(ValidationError::error(
        ErrorCode::SignatureInvalid,
        name,
        format!("signature does not verify against the key of '{}'", issuer.subject()),
      ));
    }

    let extensions = read_extensions(subject);
    for warning in &extensions.warnings {
      errors.push(ValidationError::warning(ErrorCode::MalformedExtension, name, warning.clone()));
    }
    let violations = profile_violations(subject.kind(), &extensions);
    let constraints_valid = violations.is_empty();
    if !constraints_valid {
      errors.push(ValidationError::error(
        ErrorCode::ConstraintViolation,
        name,
        format!("{:?} profile: {}", subject.kind(), violations.join("; ")),
      ));
    }

    let validity_valid = match self.validity_error(subject) {
      Some(err) => {
        errors.push(err);
        false
      }
      None => true,
    };

    LinkOutcome { chained, signature_valid, constraints_valid, validity_valid, errors }
  }

  /// AND of every link; the result carries no revocation verdict.
  pub fn validate_chain(&self, path: &TrustPath) -> ValidationResult {
    let mut result = ValidationResult::new(self.at);
    let mut chained = true;
    let mut signature = true;
    let mut constraints = true;
    let mut validity = true;

    for (issuer, subject) in path.links() {
      let link = self.validate_link(issuer, subject);
      chained &= link.chained;
      signature &= link.signature_valid;
      constraints &= link.constraints_valid;
      validity &= link.validity_valid;
      result.errors.extend(link.errors);
    }

    result.chain_valid = Some(chained);
    result.signature_valid = Some(signature);
    result.constraints_valid = Some(constraints);
    result.validity_valid = Some(validity);
    result.trust_path = path.certificates().iter().map(|c| c.subject().clone()).collect();
    result.classify();
    result
  }

  fn validity_error(&self, cert: &Certificate) -> Option<ValidationError> {
    if self.at < cert.not_before() {
      Some(ValidationError::error(
        ErrorCode::NotYetValid,
        cert.subject(),
        format!("not valid before {}", cert.not_before().to_rfc3339()),
      ))
    } else if self.at > cert.not_after() {
      Some(ValidationError::error(
        ErrorCode::Expired,
        cert.subject(),
        format!("expired at {}", cert.not_after().to_rfc3339()),
      ))
    } else {
      None
    }
  }
}

/// Profile rules by declared type. `Unknown` has none.
fn profile_violations(kind: CertificateType, ext: &CertificateExtensions) -> Vec<&'static str> {
  let mut violations = Vec::new();
  match kind {
    CertificateType::RootAuthority | CertificateType::IntermediateSigner => {
      if !ext.is_ca {
        violations.push("CA flag must be set");
      }
      if !ext.allows(KeyUsage::CertificateSigning) {
        violations.push("key usage must include certificate signing");
      }
      if !ext.allows(KeyUsage::CrlSigning) {
        violations.push("key usage must include CRL signing");
      }
    }
    CertificateType::LeafSigner => {
      if ext.is_ca {
        violations.push("CA flag must not be set");
      }
      if !ext.allows(KeyUsage::DigitalSignature) {
        violations.push("key usage must include digital signature");
      }
    }
    CertificateType::Unknown => {}
  }
  violations
}

// validation/path_builder.rs

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::crypto::{read_extensions, verify_self_signature};
use crate::domain::error::{EngineResult, PathNotFound};
use crate::domain::lookup::CertificateLookup;
use crate::domain::types::{check_max_depth, Certificate, TrustPath};

/// Walks issuer links upwards until it reaches a self-signed CA.
pub struct PathBuilder<'a> {
  lookup: &'a dyn CertificateLookup,
  max_depth: usize,
}

impl<'a> PathBuilder<'a> {
  pub fn new(lookup: &'a dyn CertificateLookup, max_depth: usize) -> EngineResult<Self> {
    check_max_depth(max_depth)?;
    Ok(Self { lookup, max_depth })
  }

  /// Anchor-first path ending at `target`.
  ///
  /// Iterative with a visited set; at most `max_depth` lookups are made, so
  /// this terminates on any input.
  pub fn build(&self, target: &Certificate) -> Result<TrustPath, PathNotFound> {
    let mut path: VecDeque<Certificate> = VecDeque::from([target.clone()]);
    let mut visited: HashSet<String> = HashSet::from([target.fingerprint().to_string()]);

    loop {
      let current = &path[0];
      if is_trust_anchor(current) {
        debug!(anchor = %current.subject(), length = path.len(), "trust anchor reached");
        return Ok(TrustPath::new_unchecked(path.into()));
      }

      if path.len() >= self.max_depth {
        debug!(subject = %current.subject(), max_depth = self.max_depth, "path depth exhausted");
        return Err(PathNotFound::DepthExceeded { max_depth: self.max_depth });
      }

      let issuer = self.find_issuer(current).ok_or_else(|| PathNotFound::IssuerNotFound {
        subject: current.subject().clone(),
        issuer: current.issuer().clone(),
      })?;

      if !visited.insert(issuer.fingerprint().to_string()) {
        return Err(PathNotFound::CycleDetected { subject: issuer.subject().clone() });
      }

      debug!(subject = %current.subject(), issuer = %issuer.subject(), "issuer found");
      path.push_front(issuer);
    }
  }

  fn find_issuer(&self, current: &Certificate) -> Option<Certificate> {
    let candidates = match self.lookup.find_by_subject_name(current.issuer()) {
      Ok(candidates) => candidates,
      Err(e) => {
        warn!(issuer = %current.issuer(), error = %e, "certificate lookup failed, treating as not found");
        return None;
      }
    };
    select_issuer(current, candidates)
  }
}

/// Self-signed (names match and the signature verifies under its own key)
/// and allowed to act as a CA.
pub fn is_trust_anchor(cert: &Certificate) -> bool {
  cert.is_self_issued() && verify_self_signature(cert) && read_extensions(cert).is_ca
}

/// Choose among certificates sharing the issuer's subject name.
///
/// Preference: validity window containing the issued certificate's
/// not-before, then the latest not-before, then the highest fingerprint so
/// equal candidates still resolve the same way every time.
pub fn select_issuer(issued: &Certificate, candidates: Vec<Certificate>) -> Option<Certificate> {
  let issued_at = issued.not_before();
  candidates
    .into_iter()
    .filter(|c| c.subject() == issued.issuer())
    .max_by(|a, b| {
      a.is_valid_at(issued_at)
        .cmp(&b.is_valid_at(issued_at))
        .then_with(|| a.not_before().cmp(&b.not_before()))
        .then_with(|| a.fingerprint().cmp(b.fingerprint()))
    })
}

// crates/engine/src/domain/error.rs
use thiserror::Error;

use super::types::DistinguishedName;

/// Reasons the path builder could not reach a trust anchor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathNotFound {
  #[error("issuer not found: no certificate with subject '{issuer}' (needed by '{subject}')")]
  IssuerNotFound {
    subject: DistinguishedName,
    issuer: DistinguishedName,
  },

  #[error("cycle detected: '{subject}' already appears in the path")]
  CycleDetected { subject: DistinguishedName },

  #[error("depth exceeded: no trust anchor within {max_depth} certificates")]
  DepthExceeded { max_depth: usize },
}

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error("decode: {0}")]
  Decode(String),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error(transparent)]
  Path(#[from] PathNotFound),
}

pub type EngineResult<T> = Result<T, EngineError>;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{EngineError, EngineResult};

/// Centralized defaults for the PKD engine.
/// All opinionated defaults should be defined here for consistency.
pub struct ValidatorDefaults;

impl ValidatorDefaults {
    // Path building
    pub const MAX_DEPTH: usize = 5; // CSCA -> link -> DSC leaves plenty of headroom
    pub const MAX_DEPTH_CEILING: usize = 10; // Hard bound, guarantees termination

    // Revocation
    pub const CHECK_REVOCATION: bool = true;
    pub const REVOCATION_SCOPE: RevocationScope = RevocationScope::LeafOnly;

    // Clock
    pub const VALIDATION_TIME: Option<DateTime<Utc>> = None; // Wall clock
}

/// Which certificates of the path get a CRL lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationScope {
    LeafOnly,
    FullPath,
}

/// Per-call validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Longest path the builder may produce, anchor and target included.
    pub max_depth: usize,
    pub revocation_scope: RevocationScope,
    /// Pin "now" for validity and CRL freshness checks. `None` uses the wall clock.
    pub validation_time: Option<DateTime<Utc>>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::secure_default()
    }
}

impl ValidationConfig {
    pub fn secure_default() -> Self {
        Self {
            max_depth: ValidatorDefaults::MAX_DEPTH,
            revocation_scope: ValidatorDefaults::REVOCATION_SCOPE,
            validation_time: ValidatorDefaults::VALIDATION_TIME,
        }
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_max_depth(self.max_depth)
    }

    /// The instant validity windows are evaluated against.
    pub fn now(&self) -> DateTime<Utc> {
        self.validation_time.unwrap_or_else(Utc::now)
    }
}

pub(crate) fn check_max_depth(max_depth: usize) -> EngineResult<()> {
    if max_depth == 0 || max_depth > ValidatorDefaults::MAX_DEPTH_CEILING {
        return Err(EngineError::Config(format!(
            "max_depth must be between 1 and {}, got {max_depth}",
            ValidatorDefaults::MAX_DEPTH_CEILING
        )));
    }
    Ok(())
}

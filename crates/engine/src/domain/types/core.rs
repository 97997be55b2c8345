use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;

/// Role a certificate was ingested under. Drives the profile checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateType {
    /// Country signing authority (CSCA), self-signed.
    RootAuthority,
    /// Link or intermediate signer issued by a root authority.
    IntermediateSigner,
    /// Document signer (DSC).
    LeafSigner,
    Unknown,
}

impl CertificateType {
    /// Root and intermediate signers must be able to issue certificates and CRLs.
    pub fn is_authority(self) -> bool {
        matches!(self, CertificateType::RootAuthority | CertificateType::IntermediateSigner)
    }
}

/// A distinguished name as rendered by the X.509 decoder
/// (e.g. `C=DE, O=bund, CN=csca-germany`).
///
/// Comparison is by a normalized key: components trimmed and lower-cased,
/// so `C=DE,CN=Root` equals `c=de, cn=root`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DistinguishedName {
    display: String,
    key: String,
}

impl DistinguishedName {
    pub fn new(name: impl Into<String>) -> Self {
        let display = name.into();
        let key = display
            .split(',')
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        Self { display, key }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Value of the first `C=` component, if any.
    pub fn country(&self) -> Option<&str> {
        self.display.split(',').find_map(|c| {
            let (attr, value) = c.split_once('=')?;
            attr.trim().eq_ignore_ascii_case("c").then(|| value.trim())
        })
    }
}

impl PartialEq for DistinguishedName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DistinguishedName {}

impl Hash for DistinguishedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DistinguishedName").field(&self.display).finish()
    }
}

impl From<String> for DistinguishedName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for DistinguishedName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<DistinguishedName> for String {
    fn from(n: DistinguishedName) -> Self {
        n.display
    }
}

/// Certificate serial number in normalized hexadecimal form.
///
/// `0x01`, `01`, `00:01` and `1` all normalize to `1`, so CRL entries match
/// regardless of how ingestion rendered them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// From big-endian bytes as stored in the certificate.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::normalize_digits(&hex::encode_upper(bytes))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    fn normalize_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_string())
        } else {
            Self(trimmed.to_ascii_uppercase())
        }
    }
}

impl FromStr for SerialNumber {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let digits: String = s.chars().filter(|c| *c != ':' && !c.is_whitespace()).collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EngineError::InvalidArgument(format!(
                "serial number '{s}' is not hexadecimal"
            )));
        }
        Ok(Self::normalize_digits(&digits))
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SerialNumber> for String {
    fn from(s: SerialNumber) -> Self {
        s.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0)
    }
}

//! In-memory lookup stores. Thread-safe; reads never block each other.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use crate::domain::lookup::{CertificateLookup, CrlLookup};
use crate::domain::types::{Certificate, CertificateRevocationList, DistinguishedName};

#[derive(Debug, Default)]
pub struct InMemoryCertificateStore {
    by_subject: RwLock<HashMap<DistinguishedName, Vec<Certificate>>>,
}

impl InMemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a certificate. Re-inserting the same fingerprint is a no-op.
    pub fn insert(&self, cert: Certificate) -> Result<()> {
        let mut map = self
            .by_subject
            .write()
            .map_err(|_| anyhow!("certificate store lock poisoned"))?;
        let entries = map.entry(cert.subject().clone()).or_default();
        if !entries.iter().any(|c| c.fingerprint() == cert.fingerprint()) {
            entries.push(cert);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_subject
            .read()
            .map(|m| m.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Certificate> for InMemoryCertificateStore {
    fn from_iter<I: IntoIterator<Item = Certificate>>(iter: I) -> Self {
        let mut map: HashMap<DistinguishedName, Vec<Certificate>> = HashMap::new();
        for cert in iter {
            let entries = map.entry(cert.subject().clone()).or_default();
            if !entries.contains(&cert) {
                entries.push(cert);
            }
        }
        Self { by_subject: RwLock::new(map) }
    }
}

impl CertificateLookup for InMemoryCertificateStore {
    fn find_by_subject_name(&self, name: &DistinguishedName) -> Result<Vec<Certificate>> {
        let map = self
            .by_subject
            .read()
            .map_err(|_| anyhow!("certificate store lock poisoned"))?;
        Ok(map.get(name).cloned().unwrap_or_default())
    }
}

/// Keeps the newest CRL (latest this-update) per issuer.
#[derive(Debug, Default)]
pub struct InMemoryCrlStore {
    by_issuer: RwLock<HashMap<DistinguishedName, CertificateRevocationList>>,
}

impl InMemoryCrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an equally new or newer CRL is already held.
    pub fn insert(&self, crl: CertificateRevocationList) -> Result<bool> {
        let mut map = self
            .by_issuer
            .write()
            .map_err(|_| anyhow!("CRL store lock poisoned"))?;
        match map.get(crl.issuer()) {
            Some(held) if held.this_update() >= crl.this_update() => Ok(false),
            _ => {
                map.insert(crl.issuer().clone(), crl);
                Ok(true)
            }
        }
    }
}

impl CrlLookup for InMemoryCrlStore {
    fn find_by_issuer(&self, issuer: &DistinguishedName) -> Result<Option<CertificateRevocationList>> {
        let map = self
            .by_issuer
            .read()
            .map_err(|_| anyhow!("CRL store lock poisoned"))?;
        Ok(map.get(issuer).cloned())
    }
}

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use x509_parser::prelude::*;

use super::certificate::asn1_to_utc;
use super::core::{DistinguishedName, SerialNumber};
use crate::domain::error::{EngineError, EngineResult};

/// A revocation list published by a signing authority.
#[derive(Debug, Clone)]
pub struct CertificateRevocationList {
    issuer: DistinguishedName,
    country_code: Option<String>,
    this_update: DateTime<Utc>,
    next_update: Option<DateTime<Utc>>,
    raw: Vec<u8>,
    revoked: BTreeSet<SerialNumber>,
}

impl CertificateRevocationList {
    /// Build from already-decoded attributes. The country code is taken from
    /// the issuer's `C=` component.
    pub fn new(
        issuer: DistinguishedName,
        this_update: DateTime<Utc>,
        next_update: Option<DateTime<Utc>>,
        revoked: impl IntoIterator<Item = SerialNumber>,
    ) -> Self {
        Self {
            country_code: issuer.country().map(str::to_uppercase),
            issuer,
            this_update,
            next_update,
            raw: Vec::new(),
            revoked: revoked.into_iter().collect(),
        }
    }

    /// Decode a DER `CertificateList`. The signature is not checked here.
    pub fn from_der(der: &[u8]) -> EngineResult<Self> {
        let (_, crl) = parse_x509_crl(der)
            .map_err(|e| EngineError::Decode(format!("crl: {e}")))?;

        let next_update = crl.next_update().map(|t| asn1_to_utc(&t)).transpose()?;
        let revoked = crl
            .iter_revoked_certificates()
            .map(|r| SerialNumber::from_bytes(r.raw_serial()));

        let mut list = Self::new(
            DistinguishedName::new(crl.issuer().to_string()),
            asn1_to_utc(&crl.last_update())?,
            next_update,
            revoked,
        );
        list.raw = der.to_vec();
        Ok(list)
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    /// Upper-case ISO 3166 code of the issuing country, if the issuer names one.
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn this_update(&self) -> DateTime<Utc> {
        self.this_update
    }

    pub fn next_update(&self) -> Option<DateTime<Utc>> {
        self.next_update
    }

    /// Raw DER; empty when built from attributes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn revoked_serials(&self) -> impl Iterator<Item = &SerialNumber> {
        self.revoked.iter()
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }

    pub fn contains(&self, serial: &SerialNumber) -> bool {
        self.revoked.contains(serial)
    }

    /// Past its next-update. A list without next-update never goes stale.
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.next_update.is_some_and(|next| next < at)
    }
}

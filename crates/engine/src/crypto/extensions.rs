//! Reads the X.509 extensions the validator cares about.
//! Never fails: anything undecodable falls back to defaults and a warning.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;
use url::Url;
use x509_parser::extensions::{DistributionPointName, GeneralName, KeyUsage as X509KeyUsage, ParsedExtension};
use x509_parser::prelude::*;

use crate::domain::types::Certificate;

/// Key usage bits (RFC 5280 4.2.1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyUsage {
    DigitalSignature,
    NonRepudiation,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    CertificateSigning,
    CrlSigning,
    EncipherOnly,
    DecipherOnly,
}

impl KeyUsage {
    fn from_extension(ku: &X509KeyUsage) -> BTreeSet<KeyUsage> {
        [
            (ku.digital_signature(), KeyUsage::DigitalSignature),
            (ku.non_repudiation(), KeyUsage::NonRepudiation),
            (ku.key_encipherment(), KeyUsage::KeyEncipherment),
            (ku.data_encipherment(), KeyUsage::DataEncipherment),
            (ku.key_agreement(), KeyUsage::KeyAgreement),
            (ku.key_cert_sign(), KeyUsage::CertificateSigning),
            (ku.crl_sign(), KeyUsage::CrlSigning),
            (ku.encipher_only(), KeyUsage::EncipherOnly),
            (ku.decipher_only(), KeyUsage::DecipherOnly),
        ]
        .into_iter()
        .filter_map(|(set, usage)| set.then_some(usage))
        .collect()
    }
}

/// What the validator needs from a certificate's extensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificateExtensions {
    /// basicConstraints cA; `false` when the extension is absent.
    pub is_ca: bool,
    pub key_usage: BTreeSet<KeyUsage>,
    pub crl_distribution_points: Vec<String>,
    /// Decode problems that were swallowed.
    pub warnings: Vec<String>,
}

impl CertificateExtensions {
    pub fn allows(&self, usage: KeyUsage) -> bool {
        self.key_usage.contains(&usage)
    }
}

pub fn read_extensions(cert: &Certificate) -> CertificateExtensions {
    let mut out = CertificateExtensions::default();

    let parsed = match parse_x509_certificate(cert.raw()) {
        Ok((_, parsed)) => parsed,
        Err(e) => {
            out.warnings.push(format!("extensions unreadable: {e}"));
            warn!(subject = %cert.subject(), error = %e, "certificate extensions unreadable, using defaults");
            return out;
        }
    };

    for ext in parsed.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => out.is_ca = bc.ca,
            ParsedExtension::KeyUsage(ku) => out.key_usage = KeyUsage::from_extension(ku),
            ParsedExtension::CRLDistributionPoints(points) => {
                for point in points.points.iter() {
                    let Some(DistributionPointName::FullName(names)) = &point.distribution_point else {
                        continue;
                    };
                    for name in names {
                        if let GeneralName::URI(uri) = name {
                            match Url::parse(uri) {
                                Ok(_) => out.crl_distribution_points.push(uri.to_string()),
                                Err(e) => out
                                    .warnings
                                    .push(format!("CRL distribution point '{uri}' is not a URL: {e}")),
                            }
                        }
                    }
                }
            }
            ParsedExtension::ParseError { error } => {
                out.warnings.push(format!(
                    "extension {} is malformed: {error}",
                    ext.oid.to_id_string()
                ));
            }
            _ => {}
        }
    }

    for w in &out.warnings {
        warn!(subject = %cert.subject(), warning = %w, "malformed certificate extension, defaults applied");
    }
    out
}

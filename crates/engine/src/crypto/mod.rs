//! Cryptographic primitives used by the validator: signature checks and
//! extension decoding. Decoder types stay behind these functions.

pub mod extensions;
pub mod signature;

pub use extensions::{read_extensions, CertificateExtensions, KeyUsage};
pub use signature::{verify_self_signature, verify_signature, Digest, SignatureAlgorithm};

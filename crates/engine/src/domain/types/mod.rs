// Re-export all types so callers can keep using `domain::types::*`.
// This keeps the public surface flat while organizing code internally.

pub use self::core::*;
pub use certificate::*;
pub use crl::*;
pub use path::*;
pub use config::*;

// Module declarations
mod core;
mod certificate;
mod crl;
mod path;
mod config;

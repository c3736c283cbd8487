//! Credential classification.
//!
//! Every platform is backed by at most one secret, read once at startup. A
//! platform whose secret is missing or still carries the placeholder prefix is
//! served from the synthetic generator instead of the network.
//!
//! - [`Credential`]: a platform's secret, if any
//! - [`CredentialKind`]: real vs. synthetic classification
//! - [`CredentialRegistry`]: immutable platform → credential mapping

mod registry;
mod types;

pub use registry::{CredentialRegistry, CredentialStatus};
pub use types::{Credential, CredentialKind, PLACEHOLDER_PREFIX};

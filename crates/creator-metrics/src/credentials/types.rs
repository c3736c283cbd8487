//! Core credential types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::platform::PlatformId;

/// Secrets starting with this prefix are development placeholders.
pub const PLACEHOLDER_PREFIX: &str = "mock-";

/// Whether a credential can be used against the real provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Real,
    Synthetic,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A platform's configured secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub platform: PlatformId,
    secret: Option<String>,
}

impl Credential {
    /// Blank secrets are treated as absent.
    pub fn new(platform: PlatformId, secret: Option<String>) -> Self {
        let secret = secret
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        Self { platform, secret }
    }

    pub fn absent(platform: PlatformId) -> Self {
        Self {
            platform,
            secret: None,
        }
    }

    pub fn kind(&self) -> CredentialKind {
        match self.secret.as_deref() {
            Some(secret) if !secret.starts_with(PLACEHOLDER_PREFIX) => CredentialKind::Real,
            _ => CredentialKind::Synthetic,
        }
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        self.kind() == CredentialKind::Real
    }

    /// The secret, only when it is usable against the provider.
    pub fn real_secret(&self) -> Option<&str> {
        if self.is_real() {
            self.secret.as_deref()
        } else {
            None
        }
    }

    #[inline]
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("platform", &self.platform)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("kind", &self.kind())
            .finish()
    }
}

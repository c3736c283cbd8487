use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::types::{Credential, CredentialKind};
use crate::platform::{MetricsDomain, PlatformId};

/// Display row for one platform's credential state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub platform: PlatformId,
    pub domain: MetricsDomain,
    pub kind: CredentialKind,
    pub has_secret: bool,
    pub has_public_api: bool,
}

/// Immutable platform → credential mapping.
///
/// Built once at startup and shared read-only by the client and the adapters.
/// Absent credentials are a normal state, so lookups never fail.
#[derive(Debug, Clone, Default)]
pub struct CredentialRegistry {
    credentials: HashMap<PlatformId, Credential>,
}

impl CredentialRegistry {
    /// A registry with no secrets at all: every platform is synthetic.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read `<PREFIX>_<PLATFORM>_API_KEY`, falling back to `<PLATFORM>_API_KEY`.
    pub fn from_env(prefix: Option<&str>) -> Self {
        Self::from_lookup(prefix, |_, key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup.
    ///
    /// The lookup receives the platform and the environment key to consult; it
    /// is asked for the prefixed key first and for the bare key second.
    pub fn from_lookup<F>(prefix: Option<&str>, lookup: F) -> Self
    where
        F: Fn(PlatformId, &str) -> Option<String>,
    {
        let credentials = PlatformId::ALL
            .into_iter()
            .map(|platform| {
                let prefixed = platform.env_key(prefix);
                let bare = platform.env_key(None);
                // A blank prefixed value must not shadow the bare key.
                let present = |key: &str| lookup(platform, key).filter(|v| !v.trim().is_empty());
                let secret = present(&prefixed).or_else(|| {
                    if prefixed != bare {
                        present(&bare)
                    } else {
                        None
                    }
                });
                (platform, Credential::new(platform, secret))
            })
            .collect();

        Self::finish(credentials)
    }

    /// Build from explicit platform secrets. Platforms not listed are absent.
    pub fn from_secrets<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = (PlatformId, S)>,
        S: Into<String>,
    {
        let credentials = secrets
            .into_iter()
            .map(|(platform, secret)| (platform, Credential::new(platform, Some(secret.into()))))
            .collect();

        Self::finish(credentials)
    }

    fn finish(credentials: HashMap<PlatformId, Credential>) -> Self {
        let registry = Self { credentials };
        let real = PlatformId::ALL
            .iter()
            .filter(|p| registry.is_real(**p))
            .count();
        info!(
            real,
            synthetic = PlatformId::ALL.len() - real,
            "Credential registry initialized"
        );
        for platform in PlatformId::ALL {
            debug!(
                platform = %platform,
                kind = %registry.resolve(platform).kind(),
                "Credential classified"
            );
        }
        registry
    }

    pub fn resolve(&self, platform: PlatformId) -> Credential {
        self.credentials
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| Credential::absent(platform))
    }

    pub fn is_real(&self, platform: PlatformId) -> bool {
        self.credentials
            .get(&platform)
            .is_some_and(Credential::is_real)
    }

    /// Per-platform classification, in declaration order.
    pub fn status(&self) -> Vec<CredentialStatus> {
        PlatformId::ALL
            .into_iter()
            .map(|platform| {
                let credential = self.resolve(platform);
                CredentialStatus {
                    platform,
                    domain: platform.domain(),
                    kind: credential.kind(),
                    has_secret: credential.has_secret(),
                    has_public_api: platform.has_public_api(),
                }
            })
            .collect()
    }

    pub fn real_platforms(&self) -> Vec<PlatformId> {
        PlatformId::ALL
            .into_iter()
            .filter(|p| self.is_real(*p))
            .collect()
    }
}

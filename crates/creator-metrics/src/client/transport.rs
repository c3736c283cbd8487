//! HTTP transport and the two routing modes.
//!
//! In direct mode the provider is called with the platform secret as a bearer
//! token. In proxy mode only request metadata is sent to a trusted proxy,
//! which holds the secret and forwards the call.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::OutboundRequest;
use crate::error::{FetchFault, MetricsError};
use crate::platform::PlatformId;

pub const DEFAULT_USER_AGENT: &str = concat!("creator-metrics/", env!("CARGO_PKG_VERSION"));

/// How requests leave the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransportMode {
    /// Call providers directly with `Authorization: Bearer <secret>`.
    #[default]
    Direct,
    /// Route through `POST {base_url}/{endpoint}`; the secret never leaves the proxy.
    Proxy { base_url: String },
}

impl TransportMode {
    pub fn proxy(base_url: impl Into<String>) -> Self {
        Self::Proxy {
            base_url: base_url.into(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Proxy { .. } => "proxy",
        }
    }
}

/// A fully prepared HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Body of a proxied request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEnvelope {
    pub original_url: String,
    pub service: String,
    pub resource: String,
    pub id: String,
}

/// Executes HTTP exchanges.
///
/// Implementations only report transport-level failures; status handling is
/// left to the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchFault>;
}

/// Build the request for the configured mode.
///
/// Returns `Ok(None)` when no URL can be resolved (proxy mode without a base
/// URL).
pub(crate) fn prepare_request(
    mode: &TransportMode,
    platform: PlatformId,
    identity: &str,
    outbound: &OutboundRequest,
    secret: &str,
) -> Result<Option<HttpRequest>, FetchFault> {
    match mode {
        TransportMode::Direct => {
            let mut headers = outbound.headers.clone();
            let mut auth = HeaderValue::from_str(&format!("Bearer {secret}")).map_err(|e| {
                FetchFault::InvalidRequest(format!("secret is not a valid header value: {e}"))
            })?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);

            Ok(Some(HttpRequest {
                method: Method::GET,
                url: outbound.url.clone(),
                headers,
                body: None,
            }))
        }
        TransportMode::Proxy { base_url } => {
            let base = base_url.trim().trim_end_matches('/');
            if base.is_empty() {
                return Ok(None);
            }

            let envelope = ProxyEnvelope {
                original_url: outbound.url.clone(),
                service: platform.as_str().to_owned(),
                resource: outbound.resource.to_owned(),
                id: identity.to_owned(),
            };
            let body = serde_json::to_value(&envelope)
                .map_err(|e| FetchFault::InvalidRequest(e.to_string()))?;

            Ok(Some(HttpRequest {
                method: Method::POST,
                url: format!("{base}/{}", platform.domain().proxy_endpoint()),
                headers: HeaderMap::new(),
                body: Some(body),
            }))
        }
    }
}

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Another crate installed one first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build the shared HTTP client.
pub fn build_client(request_timeout: Duration, user_agent: &str) -> Result<Client, MetricsError> {
    install_rustls_provider();

    let mut builder = Client::builder().user_agent(user_agent);
    if request_timeout > Duration::ZERO {
        builder = builder.timeout(request_timeout);
    }

    Ok(builder.build()?)
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchFault> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

//! Network client that executes [`Request`] values.
//!
//! [`Fetch`] is the seam sources depend on; [`HttpClient`] is the reqwest-backed
//! implementation with shared timeout, user-agent, compression, proxy and
//! cookie policy, plus enforcement of declared rate limits. Nothing here
//! retries: transport errors surface unchanged and every received response is
//! final.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder, Proxy};
use tracing::{debug, warn};

use crate::source::{Result, SourceError};
use crate::user_agent;

use super::rate_limiter::{RateLimitPolicy, RateLimiter};
use super::{CachePolicy, FORM_CONTENT_TYPE, Request, Response};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Executes requests on behalf of sources.
///
/// Uses `async_trait` so sources can receive `&dyn Fetch`.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Sends `request` and returns the complete response.
    async fn fetch(&self, request: Request) -> Result<Response>;
}

/// Construction settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
    /// When false, declared rate limits are ignored.
    pub enforce_rate_limits: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            user_agent: user_agent::default_user_agent(),
            enforce_rate_limits: true,
        }
    }
}

/// reqwest-backed [`Fetch`] implementation.
pub struct HttpClient {
    client: Client,
    limiter: RateLimiter,
}

impl HttpClient {
    /// Builds a client using `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when client construction fails.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let client = build_http_client(settings)?;
        let limiter = if settings.enforce_rate_limits {
            RateLimiter::new()
        } else {
            debug!("rate limiting disabled");
            RateLimiter::disabled()
        };
        Ok(Self { client, limiter })
    }

    /// Registers rate limits declared by a source.
    pub fn declare(&self, policies: &[RateLimitPolicy]) {
        for policy in policies {
            self.limiter.register(policy);
        }
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Fetch for HttpClient {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn fetch(&self, request: Request) -> Result<Response> {
        self.limiter.acquire(request.url.as_str()).await;

        let request_url = request.url.clone();
        let mut headers = request.headers;
        if request.cache == CachePolicy::ForceNetwork {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }

        let mut builder = self
            .client
            .request(request.method, request.url.clone());
        if let Some(body) = request.body {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            }
            builder = builder.body(body.encode());
        }

        let response = builder
            .headers(headers)
            .send()
            .await
            .map_err(|error| SourceError::network(request_url.as_str(), &error.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|error| SourceError::network(request_url.as_str(), &error.to_string()))?;

        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
            url: final_url,
            request_url,
        })
    }
}

/// Builds the shared reqwest client.
///
/// Some restricted sandboxes panic when reqwest queries system proxy settings;
/// in that case the client is rebuilt with env-proxy lookup only.
fn build_http_client(settings: &ClientSettings) -> Result<Client> {
    match try_build_client(settings, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(settings, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(SourceError::invalid_request(
                    "HTTP client construction panicked while reading proxy settings",
                )),
                Err(BuildClientFailure::Build(error)) => Err(SourceError::invalid_request(
                    &format!("HTTP client construction failed: {error}"),
                )),
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(SourceError::invalid_request(&format!(
            "HTTP client construction failed: {error}"
        ))),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    settings: &ClientSettings,
    disable_system_proxy_lookup: bool,
) -> std::result::Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(|| {
        let mut builder = base_builder(settings);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(settings: &ClientSettings) -> ClientBuilder {
    Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.read_timeout)
        .user_agent(settings.user_agent.clone())
        .cookie_store(true)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

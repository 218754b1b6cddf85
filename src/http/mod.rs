//! HTTP values exchanged between sources and the network client.
//!
//! Sources never talk to the network directly. They build [`Request`] values,
//! a [`Fetch`] implementation turns them into [`Response`] values, and the
//! source parses those. Every response is final once received, including
//! non-2xx statuses.

mod client;
mod rate_limiter;

pub use client::{ClientSettings, Fetch, HttpClient};
pub use rate_limiter::{RateLimitPolicy, RateLimiter, extract_host};

use std::borrow::Cow;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use scraper::Html;
use serde::de::DeserializeOwned;
use url::Url;

use crate::source::{Result, SourceError};

/// Content type of every form body built by sources.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Header marking a request as an AJAX call, required by WordPress admin-ajax.
pub const X_REQUESTED_WITH: &str = "x-requested-with";

/// Whether the client may serve a request from an HTTP cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    Default,
    /// Always hit the network (`Cache-Control: no-cache`).
    ForceNetwork,
}

/// An ordered `application/x-www-form-urlencoded` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, keeping insertion order.
    #[must_use]
    pub fn add(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Percent-encodes the fields as `a=1&b=2`.
    #[must_use]
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    #[must_use]
    pub fn content_length(&self) -> usize {
        self.encode().len()
    }
}

/// A request description handed to the network client.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<FormBody>,
    pub cache: CachePolicy,
}

impl Request {
    #[must_use]
    pub fn get(url: Url, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url,
            headers,
            body: None,
            cache: CachePolicy::Default,
        }
    }

    #[must_use]
    pub fn post(url: Url, headers: HeaderMap, body: FormBody) -> Self {
        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(body),
            cache: CachePolicy::Default,
        }
    }

    /// A form POST carrying the headers WordPress AJAX endpoints expect:
    /// `Content-Length`, `Content-Type` and `X-Requested-With: XMLHttpRequest`.
    #[must_use]
    pub fn xhr_post(url: Url, mut headers: HeaderMap, body: FormBody) -> Self {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.content_length()));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(
            HeaderName::from_static(X_REQUESTED_WITH),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        Self::post(url, headers, body)
    }

    /// Bypasses any HTTP cache for this request.
    #[must_use]
    pub fn force_network(mut self) -> Self {
        self.cache = CachePolicy::ForceNetwork;
        self
    }

    /// Form field value, if this request carries a form body.
    #[must_use]
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.body.as_ref().and_then(|body| body.get(name))
    }
}

/// A fully received response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Final URL after redirects.
    pub url: Url,
    /// URL of the request that produced this response.
    pub request_url: Url,
}

impl Response {
    /// A response whose final URL equals the request URL.
    #[must_use]
    pub fn new(request_url: Url, status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            url: request_url.clone(),
            request_url,
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body parsed as an HTML document.
    ///
    /// The returned tree is not `Send`; drop it before awaiting.
    #[must_use]
    pub fn html(&self) -> Html {
        Html::parse_document(&self.text())
    }

    /// Body decoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Json`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|error| SourceError::json(self.url.as_str(), &error.to_string()))
    }
}

/// Parses an absolute URL.
///
/// # Errors
///
/// Returns [`SourceError::InvalidRequest`] when `raw` is not a valid URL.
pub fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|error| SourceError::invalid_request(&format!("'{raw}': {error}")))
}

/// First query parameter value for `name` in `url`.
#[must_use]
pub fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Builds a header value from runtime text.
///
/// # Errors
///
/// Returns [`SourceError::InvalidRequest`] when `value` contains bytes not
/// allowed in a header.
pub fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| SourceError::invalid_request(&format!("invalid header value '{value}'")))
}

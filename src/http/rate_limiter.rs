//! Per-host request rate limiting.
//!
//! Sources only *declare* [`RateLimitPolicy`] values. The [`RateLimiter`] owned
//! by the HTTP client enforces them: at most `permits` requests to a host in
//! any window of length `period`. A policy without a host applies to every
//! request issued through the limiter.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use manga_sources::http::{RateLimitPolicy, RateLimiter};
//!
//! # async fn example() {
//! let limiter = RateLimiter::new();
//! limiter.register(&RateLimitPolicy::per_host("https://example.com", 2, Duration::from_secs(1)));
//!
//! // The first two requests proceed immediately, the third waits for the window.
//! limiter.acquire("https://example.com/a").await;
//! limiter.acquire("https://example.com/b").await;
//! limiter.acquire("https://example.com/c").await;
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Key under which host-less policies are stored.
const ANY_HOST: &str = "*";

/// A declared request budget: `permits` requests per `period`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Lowercased host the policy applies to, `None` for every host.
    pub host: Option<String>,
    pub permits: u32,
    pub period: Duration,
}

impl RateLimitPolicy {
    /// Budget for the host of `url_or_host`.
    #[must_use]
    pub fn per_host(url_or_host: &str, permits: u32, period: Duration) -> Self {
        let host = if url_or_host.contains("://") {
            extract_host(url_or_host)
        } else {
            url_or_host.trim().to_ascii_lowercase()
        };
        Self {
            host: Some(host),
            permits: permits.max(1),
            period,
        }
    }

    /// Budget shared by every request.
    #[must_use]
    pub fn global(permits: u32, period: Duration) -> Self {
        Self {
            host: None,
            permits: permits.max(1),
            period,
        }
    }

    fn key(&self) -> &str {
        self.host.as_deref().unwrap_or(ANY_HOST)
    }
}

/// Sliding window of issue times for one policy.
#[derive(Debug)]
struct Window {
    permits: usize,
    period: Duration,
    issued: Mutex<VecDeque<Instant>>,
}

impl Window {
    fn new(policy: &RateLimitPolicy) -> Self {
        Self {
            permits: policy.permits as usize,
            period: policy.period,
            issued: Mutex::new(VecDeque::new()),
        }
    }

    async fn wait_turn(&self, key: &str) {
        // The guard is held across the sleep so waiters queue in order.
        let mut issued = self.issued.lock().await;
        let now = Instant::now();
        while issued
            .front()
            .is_some_and(|first| now.duration_since(*first) >= self.period)
        {
            issued.pop_front();
        }

        if issued.len() >= self.permits
            && let Some(first) = issued.front().copied()
        {
            let delay = self.period.saturating_sub(now.duration_since(first));
            debug!(
                host = key,
                delay_ms = delay.as_millis(),
                "applying rate limit delay"
            );
            tokio::time::sleep(delay).await;
            issued.pop_front();
        }

        issued.push_back(Instant::now());
    }
}

/// Enforces registered [`RateLimitPolicy`] values.
///
/// Designed to be shared behind `Arc`; `DashMap` keeps registration and lookup
/// lock-free, and each window has its own `tokio::sync::Mutex`.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<String, Arc<Window>>,
    disabled: bool,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A limiter that never delays, whatever is registered.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            windows: DashMap::new(),
            disabled: true,
        }
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Registers a policy. A later policy for the same host replaces the
    /// earlier one.
    #[instrument(skip(self), fields(host = policy.key()))]
    pub fn register(&self, policy: &RateLimitPolicy) {
        debug!(
            permits = policy.permits,
            period_ms = policy.period.as_millis(),
            "registering rate limit"
        );
        self.windows
            .insert(policy.key().to_string(), Arc::new(Window::new(policy)));
    }

    /// Number of registered policies.
    #[must_use]
    pub fn policy_count(&self) -> usize {
        self.windows.len()
    }

    /// Waits until a request to `url` fits every applicable budget.
    #[instrument(skip(self), fields(host))]
    pub async fn acquire(&self, url: &str) {
        if self.disabled {
            return;
        }

        let host = extract_host(url);
        tracing::Span::current().record("host", host.as_str());

        // Clone the Arcs so no DashMap shard lock is held across an await.
        let windows: Vec<(String, Arc<Window>)> = [host.as_str(), ANY_HOST]
            .into_iter()
            .filter_map(|key| {
                self.windows
                    .get(key)
                    .map(|window| (key.to_string(), Arc::clone(window.value())))
            })
            .collect();

        for (key, window) in windows {
            window.wait_turn(&key).await;
        }
    }
}

/// Extracts the lowercased host from a URL.
///
/// Returns "unknown" for malformed URLs so such requests still share a budget.
///
/// ```
/// use manga_sources::http::extract_host;
///
/// assert_eq!(extract_host("https://MHScans.com/manga/x/"), "mhscans.com");
/// assert_eq!(extract_host("https://ai3.slimeread.com:8443/books"), "ai3.slimeread.com");
/// assert_eq!(extract_host("not a url"), "unknown");
/// ```
#[must_use]
pub fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| "unknown".to_string())
}

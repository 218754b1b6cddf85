//! Shared User-Agent string for source HTTP traffic.

/// Default User-Agent for every source request (no per-source name in header).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    format!(
        "{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

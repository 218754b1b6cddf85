pub mod socket_guard;

use manga_sources::{ClientSettings, HttpClient};

/// Client for mock servers: no declared limits slow the test down.
#[must_use]
pub fn unthrottled_client() -> HttpClient {
    let settings = ClientSettings {
        enforce_rate_limits: false,
        ..ClientSettings::default()
    };
    HttpClient::new(&settings).expect("client should build")
}

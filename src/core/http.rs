use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

pub const APP_USER_AGENT: &str = "PureLauncher/0.1.0";

/// Manifest fetches give up after this long.
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(30);

/// File downloads (client jars can be large) give up after this long.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Build the shared HTTP client. Timeouts are applied per request by the
/// transport that owns the request.
///
/// `identity` encoding keeps `Content-Length` equal to the bytes we stream,
/// so progress totals stay meaningful.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

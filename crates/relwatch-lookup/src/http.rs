//! Shared HTTP helpers.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::error::LookupError;

pub(crate) const USER_AGENT: &str = concat!("relwatch/", env!("CARGO_PKG_VERSION"));

/// Client for lookups. Per-request timeouts are set by the caller.
pub fn build_client(allow_invalid_certs: bool) -> Result<Client, LookupError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(allow_invalid_certs)
        .build()
        .map_err(|e| LookupError::InvalidConfig(format!("Failed to create HTTP client: {e}")))
}

/// Send `request` with `timeout`. A timeout is a [`LookupError::Fetch`].
pub(crate) async fn send(request: RequestBuilder, timeout: Duration) -> Result<Response, LookupError> {
    request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| LookupError::Fetch(format!("Request failed: {e}")))
}

/// Body of a 2xx response.
pub(crate) async fn text(response: Response) -> Result<String, LookupError> {
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    response
        .text()
        .await
        .map_err(|e| LookupError::Fetch(format!("Failed to read body: {e}")))
}

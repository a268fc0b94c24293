//! HTTP plumbing shared by the adapters.
//!
//! Every adapter maps transport failures and response statuses the same way:
//! - transport failure or timeout -> `NetworkError`
//! - 401 -> `AuthenticationFailed`, 403 -> `AuthorizationFailed`
//! - 429 -> `RateLimited`, anything else non-2xx -> `ServerError`
//! - a 2xx body that does not decode -> `InvalidResponse`

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use crate::config::ProviderSettings;
use crate::error::{ProviderError, ProviderResult};

/// Longest body excerpt kept in error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// Builds the HTTP client used by one adapter.
pub(crate) fn build_client(settings: &ProviderSettings) -> ProviderResult<Client> {
    Client::builder()
        .timeout(settings.timeout)
        .user_agent(&settings.user_agent)
        .build()
        .map_err(|e| {
            ProviderError::network(format!("failed to create HTTP client: {}", e)).with_source(e)
        })
}

/// Sends a request and checks the response status.
pub(crate) async fn send(request: RequestBuilder) -> ProviderResult<Response> {
    let response = request.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            "request timeout".to_string()
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            format!("request failed: {}", e)
        };
        ProviderError::network(message).with_source(e)
    })?;

    check_status(response).await
}

/// Maps a non-success status onto the error taxonomy.
pub(crate) async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    trace!(status = %status, url = %response.url(), "received response");

    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ProviderError::authentication(
            "credential expired or invalid",
        )),
        StatusCode::FORBIDDEN => Err(ProviderError::authorization("access denied to calendar")),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )))
        }
        s => {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %s, "unexpected response status");
            Err(ProviderError::server(format!(
                "unexpected status {}: {}",
                s,
                excerpt(&body)
            )))
        }
    }
}

/// Reads the full body as text.
pub(crate) async fn read_text(response: Response) -> ProviderResult<String> {
    response.text().await.map_err(|e| {
        ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
    })
}

/// Reads and decodes a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let body = read_text(response).await?;
    serde_json::from_str(&body).map_err(|e| {
        ProviderError::parse(format!("failed to parse response: {}", e)).with_source(e)
    })
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

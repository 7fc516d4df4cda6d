//! Shared HTTP client and header/status utilities for speech and agent providers.

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::ConciergeError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(4)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a non-success HTTP status to a concierge error.
pub fn status_to_error(status: u16, body: &str) -> ConciergeError {
    match status {
        401 | 403 => ConciergeError::Authentication(body.to_string()),
        429 => ConciergeError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => ConciergeError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

/// Strip a trailing slash from a configured base URL.
pub fn trim_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Run a provider request under a hard time budget; elapse maps to
/// `ConciergeError::Timeout` carrying the budget in milliseconds.
pub async fn within_deadline<T>(
    budget: Duration,
    request: impl Future<Output = Result<T, ConciergeError>>,
) -> Result<T, ConciergeError> {
    let budget_ms = budget.as_millis() as u64;
    match tokio::time::timeout(budget, request).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ConciergeError::Timeout(budget_ms)),
    }
}

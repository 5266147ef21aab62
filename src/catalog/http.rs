//! Response handling shared by the HTTP adapters.
//!
//! Every provider maps statuses the same way: 404 is `NotFound`, 429 is
//! `RateLimited`, any other non-success is a `Provider` error carrying the
//! body's message when one can be extracted.

use serde::de::DeserializeOwned;

use super::domain::{CatalogError, ProviderId};

/// Map a transport failure.
pub fn network(e: reqwest::Error) -> CatalogError {
    CatalogError::Network(e.to_string())
}

/// Check the status and decode the JSON body.
///
/// `what` names the resource for `NotFound` messages.
pub async fn decode<T: DeserializeOwned>(
    provider: ProviderId,
    what: &str,
    response: reqwest::Response,
) -> Result<T, CatalogError> {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(CatalogError::NotFound(format!("{} {}", provider, what)));
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CatalogError::RateLimited(provider));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::provider(provider, status_message(status, &body)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| CatalogError::Parse(e.to_string()))
}

/// Best-effort error text: a JSON `message`/`error`/`detail` field, or the
/// status line.
fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| extract_message(&v));

    match detail {
        Some(msg) => format!("HTTP {}: {}", status.as_u16(), msg),
        None => format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        ),
    }
}

fn extract_message(value: &serde_json::Value) -> Option<String> {
    // Spotify: {"error": {"status": 401, "message": ".."}}
    // Apple:   {"errors": [{"title": "..", "detail": ".."}]}
    // MusicBrainz: {"error": ".."}
    if let Some(msg) = value.pointer("/error/message").and_then(|m| m.as_str()) {
        return Some(msg.to_string());
    }
    if let Some(err) = value.pointer("/errors/0") {
        return err
            .get("detail")
            .or_else(|| err.get("title"))
            .and_then(|m| m.as_str())
            .map(String::from);
    }
    value
        .get("error")
        .and_then(|m| m.as_str())
        .map(String::from)
}

/// Spotify and Apple both cap a search page at 50 (Apple's typed search at 25).
pub fn clamp_limit(limit: usize, max: usize) -> usize {
    limit.clamp(1, max)
}

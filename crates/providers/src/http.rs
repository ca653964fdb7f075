//! Plumbing shared by the provider clients.

use std::time::Duration;

use eyre::Result;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tutorbook_core::errors::ProviderError;

/// Client with a bounded timeout. Calls are never retried.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

pub(crate) fn unreachable(error: reqwest::Error) -> ProviderError {
    ProviderError::Unreachable(error.to_string())
}

/// Checks the status and decodes the JSON body of a provider response.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Unreachable(format!("Malformed provider response: {}", e)))
}

pub(crate) async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pulls the human readable message out of a provider error body.
///
/// Understands `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ..}`; anything else is returned as sent.
pub fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let nested = json.get("error").and_then(|e| match e {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("message").and_then(Value::as_str).map(str::to_string),
        _ => None,
    });

    nested
        .or_else(|| json.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

//! Shared request/response status handling.

use crate::error::{ClientError, Result};
use crate::types::ApiErrorBody;
use reqwest::{Response, StatusCode};
use tracing::warn;

/// Map a failed `send()` to a client error.
///
/// `send()` only fails when no usable response arrived, so everything here is
/// a network-level failure.
pub(crate) fn send_error(e: reqwest::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

/// Pass successful responses through and turn the rest into errors.
///
/// 401/403 become `Authorization`; other statuses become `ServerError` with
/// the `{error}` field of the body when present, else the raw body text.
pub(crate) async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!(status = %status, error = %message, "Request not authorized");
        let message = if message.is_empty() {
            "session expired, please log in again".to_string()
        } else {
            message
        };
        return Err(ClientError::Authorization(message));
    }

    Err(ClientError::ServerError {
        status: status.as_u16(),
        message,
    })
}

/// Extract the human-readable message of an error body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.trim().to_string(),
    }
}

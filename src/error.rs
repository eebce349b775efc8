//! Error type shared by the network layer and the executors.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced by calls to the remote execution service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, CORS, offline, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status
    #[error("Request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request was cancelled through its abort signal
    #[error("Request aborted")]
    Aborted,

    /// No base URL / assistant configured yet
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Rejected locally before any network call
    #[error("{0}")]
    Rejected(String),

    /// Any other error raised by a browser API
    #[error("Browser error: {0}")]
    Js(String),
}

impl ClientError {
    /// Human-readable text for toasts.  HTTP errors prefer the `detail`
    /// field of a JSON error body when the service sends one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http { status, body } => {
                let detail = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_owned));
                match detail {
                    Some(detail) => format!("{} ({})", detail, status),
                    None => format!("Request failed with status {}", status),
                }
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        // fetch() rejects with a DOMException named "AbortError" when the
        // signal fires.
        let name = js_sys::Reflect::get(&value, &JsValue::from_str("name"))
            .ok()
            .and_then(|n| n.as_string());
        if name.as_deref() == Some("AbortError") {
            return ClientError::Aborted;
        }
        match value.as_string() {
            Some(s) => ClientError::Js(s),
            None => ClientError::Network(format!("{:?}", value)),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_prefers_detail_field() {
        let err = ClientError::Http {
            status: 404,
            body: r#"{"detail":"Thread not found"}"#.to_string(),
        };
        assert_eq!(err.user_message(), "Thread not found (404)");
    }

    #[test]
    fn http_error_without_json_body() {
        let err = ClientError::Http {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert_eq!(err.user_message(), "Request failed with status 502");
    }
}

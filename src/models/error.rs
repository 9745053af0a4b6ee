use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
pub const INVALID_ID: &str = "INVALID_ID";

/// Separator placed between the segments of a validation error location.
const LOC_SEPARATOR: &str = " → ";

/// The single error shape every failed API call is converted into.
///
/// `status_code` is zero when no response was received at all.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status_code: u16,
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
    detail: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    additional_info: Option<Value>,
}

impl ApiError {
    pub fn new(status_code: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }

    /// No response was obtained: connection refused, DNS failure, timeout or
    /// a body that could not be read.
    pub fn network(err: reqwest::Error) -> Self {
        Self::new(0, NETWORK_ERROR, err.to_string())
    }

    /// Normalize a non-2xx response.
    ///
    /// Checked in order: validation `detail` array, structured `error`
    /// object, then the bare status.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let code = status.as_u16();
        let envelope: ErrorEnvelope = serde_json::from_slice(body).unwrap_or_default();

        if let Some(Value::Array(entries)) = &envelope.detail {
            if !entries.is_empty() {
                let message = entries
                    .iter()
                    .map(describe_validation_entry)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Self::new(code, VALIDATION_ERROR, message)
                    .with_details(Some(Value::Array(entries.clone())));
            }
        }

        if let Some(error) = envelope.error {
            let error_code = error
                .code
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| status_code(code));
            let message = error
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| generic_message(code));
            return Self::new(code, error_code, message).with_details(error.additional_info);
        }

        Self::new(code, status_code(code), generic_message(code))
    }

    /// A resource id that cannot be placed in a URL path segment. No request
    /// is sent.
    pub fn invalid_id(id: &str) -> Self {
        Self::new(0, INVALID_ID, format!("Invalid resource ID {id:?}"))
    }

    /// A 2xx response whose body is not JSON.
    pub fn invalid_response(status: StatusCode, err: serde_json::Error) -> Self {
        Self::new(
            status.as_u16(),
            INVALID_RESPONSE,
            format!("Failed to decode response body: {err}"),
        )
    }

    pub fn is_network(&self) -> bool {
        self.status_code == 0 && self.code == NETWORK_ERROR
    }
}

fn status_code(status: u16) -> String {
    format!("HTTP_{status}")
}

fn generic_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

fn describe_validation_entry(entry: &Value) -> String {
    let field = match entry.get("loc") {
        Some(Value::Array(segments)) => segments
            .iter()
            .map(|segment| match segment {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(LOC_SEPARATOR),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let msg = entry.get("msg").and_then(Value::as_str).unwrap_or_default();
    format!("{field}: {msg}")
}

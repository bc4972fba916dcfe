use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - access token missing, expired, or invalid")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            // 400 bodies carry field-level validation messages; keep them whole
            400 => ApiError::BadRequest(body.to_string()),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(body.to_string()),
            404 => ApiError::NotFound(Self::truncate_body(body)),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(Self::truncate_body(body)),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, Self::truncate_body(body))),
        }
    }

    /// Extract a displayable message from the server's error payload, if
    /// the variant carries one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ApiError::BadRequest(body)
            | ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError(body) => extract_message(body),
            _ => None,
        }
    }
}

/// Produce one human-readable string from a server error body.
///
/// Precedence, first non-empty source wins:
/// 1. a plain string body (including non-JSON text responses),
/// 2. a JSON object's `message` field,
/// 3. all field-level messages (string or list of strings) flattened
///    across fields in payload order, space-joined.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        // Plain-text body, e.g. from a proxy
        return Some(trimmed.to_string());
    };

    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Object(map) => {
            if let Some(Value::String(message)) = map.get("message") {
                let message = message.trim();
                if !message.is_empty() {
                    return Some(message.to_string());
                }
            }

            let mut parts: Vec<&str> = Vec::new();
            for entry in map.values() {
                match entry {
                    Value::String(s) if !s.trim().is_empty() => parts.push(s),
                    Value::Array(items) => {
                        for item in items {
                            if let Value::String(s) = item {
                                if !s.trim().is_empty() {
                                    parts.push(s);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session may have expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// The backend reports failures as `{"detail": "..."}`; validation
    /// failures carry a list of `{"msg": "..."}` objects instead.
    pub fn extract_detail(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_detail(body).unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            400 | 409 | 422 => ApiError::Validation(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// Message the backend supplied, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::Validation(m)
            | ApiError::ServerError(m) => Some(m.as_str()).filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

/// Backend `detail` message carried by an error chain, if any.
pub fn detail_of(err: &anyhow::Error) -> Option<String> {
    err.downcast_ref::<ApiError>()
        .and_then(ApiError::detail)
        .map(str::to_string)
}

/// The backend's `detail` message, or `fallback`.
pub fn detail_or(err: &anyhow::Error, fallback: &str) -> String {
    detail_of(err).unwrap_or_else(|| fallback.to_string())
}

pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized))
}

pub fn is_access_denied(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ApiError>(), Some(ApiError::AccessDenied(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_uses_detail() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail":"Invite not found or expired"}"#);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.detail(), Some("Invite not found or expired"));
    }

    #[test]
    fn test_validation_list_detail() {
        let body = r#"{"detail":[{"loc":["body","date"],"msg":"field required"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.detail(), Some("field required"));
    }

    #[test]
    fn test_plain_body_and_unauthorized() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, ApiError::ServerError(ref m) if m == "upstream down"));
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized));
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "é".repeat(400);
        let msg = ApiError::truncate_body(&body);
        assert!(msg.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_anyhow_helpers() {
        let err: anyhow::Error = ApiError::AccessDenied("Admins only".into()).into();
        assert!(is_access_denied(&err));
        assert!(!is_unauthorized(&err));
        assert_eq!(detail_or(&err, "Failed"), "Admins only");

        let other = anyhow::anyhow!("socket closed");
        assert_eq!(detail_or(&other, "Failed to restore member"), "Failed to restore member");

        let wrapped = anyhow::Error::from(ApiError::Unauthorized).context("Failed to load meetings");
        assert!(is_unauthorized(&wrapped));
    }
}

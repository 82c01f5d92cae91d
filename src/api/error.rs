use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be invalid or expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("{message}")]
    Api {
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for raw response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Extract the backend's error message from a `{"error": "..."}` payload,
    /// falling back to the (truncated) raw body when there is none.
    fn extract_message(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
                return message.to_string();
            }
        }
        Self::truncate_body(body)
    }

    fn truncate_body(body: &str) -> String {
        if body.is_empty() {
            "request failed".to_string()
        } else if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            // The cap is in bytes; back off to a char boundary so a
            // multibyte body (HTML, localized error pages) can't panic
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            status => ApiError::Api { status, message },
        }
    }

    /// Whether this error indicates the session token can no longer be
    /// trusted. Used to escalate a failed current-user fetch into a logout.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_backend_message() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error": "content too long"}"#,
        );
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "content too long");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_401_is_unauthorized() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"error": "bad token"}"#);
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_from_status_falls_back_to_raw_body() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "plain text failure");
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "plain text failure");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let text = err.to_string();
        assert!(text.contains("truncated"));
        assert!(text.len() < body.len());
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 499 ASCII bytes, then multibyte chars straddling the byte cap
        let body = format!("{}{}", "x".repeat(499), "é".repeat(10));
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let text = err.to_string();
        assert!(text.contains("truncated"));
        assert!(text.contains(&format!("{} total bytes", body.len())));
    }

    #[test]
    fn test_empty_body_gets_generic_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "");
        assert!(err.to_string().contains("request failed"));
    }
}

//! Typed errors for transport operations
//!
//! One variant per operation so the caller always knows which kind of call
//! failed. Each carries the request path and a human-readable reason; the
//! HTTP status is kept when a response was received.

use thiserror::Error;

/// Generic create failure text, used when the server gives no `message`
pub const CREATE_FALLBACK_MESSAGE: &str = "Failed to create the data";

/// Transport failure, normalized to a single error per call
#[derive(Debug, Error)]
pub enum ApiError {
    /// GET failed (status, network or undecodable body)
    #[error("Failed to fetch {path}: {reason}")]
    Fetch {
        path: String,
        reason: String,
        status: Option<u16>,
    },

    /// POST failed; `message` is the server-provided text when present
    #[error("{message}")]
    Create {
        path: String,
        message: String,
        status: Option<u16>,
    },

    /// PUT failed
    #[error("Failed to update {path}: {reason}")]
    Update {
        path: String,
        reason: String,
        status: Option<u16>,
    },

    /// DELETE failed
    #[error("Failed to delete {path}: {reason}")]
    Delete {
        path: String,
        reason: String,
        status: Option<u16>,
    },
}

/// Which operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl ApiError {
    /// Build the error for `op` from a reason string
    pub fn new(op: Operation, path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_status(op, path, reason, None)
    }

    pub fn with_status(
        op: Operation,
        path: impl Into<String>,
        reason: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        let path = path.into();
        let reason = reason.into();
        match op {
            Operation::Fetch => ApiError::Fetch {
                path,
                reason,
                status,
            },
            Operation::Create => ApiError::Create {
                path,
                message: reason,
                status,
            },
            Operation::Update => ApiError::Update {
                path,
                reason,
                status,
            },
            Operation::Delete => ApiError::Delete {
                path,
                reason,
                status,
            },
        }
    }

    /// Convert a non-success HTTP status (and any body text) into a typed error
    pub fn from_http_status(
        op: Operation,
        path: impl Into<String>,
        status: reqwest::StatusCode,
        body: &str,
    ) -> Self {
        let reason = match op {
            Operation::Create => server_message(body)
                .unwrap_or_else(|| CREATE_FALLBACK_MESSAGE.to_string()),
            _ => format!("HTTP {}", status),
        };
        Self::with_status(op, path, reason, Some(status.as_u16()))
    }

    /// Convert a reqwest failure (connect, timeout, decode) into a typed error
    pub fn from_network_error(op: Operation, path: impl Into<String>, e: reqwest::Error) -> Self {
        let reason = if e.is_timeout() {
            format!("Request timeout: {}", e)
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else if e.is_decode() {
            format!("Invalid response body: {}", e)
        } else {
            e.to_string()
        };
        let reason = match op {
            Operation::Create => format!("{}: {}", CREATE_FALLBACK_MESSAGE, reason),
            _ => reason,
        };
        Self::with_status(op, path, reason, e.status().map(|s| s.as_u16()))
    }

    pub fn operation(&self) -> Operation {
        match self {
            ApiError::Fetch { .. } => Operation::Fetch,
            ApiError::Create { .. } => Operation::Create,
            ApiError::Update { .. } => Operation::Update,
            ApiError::Delete { .. } => Operation::Delete,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ApiError::Fetch { path, .. }
            | ApiError::Create { path, .. }
            | ApiError::Update { path, .. }
            | ApiError::Delete { path, .. } => path,
        }
    }

    /// HTTP status, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Fetch { status, .. }
            | ApiError::Create { status, .. }
            | ApiError::Update { status, .. }
            | ApiError::Delete { status, .. } => *status,
        }
    }

    /// True when no HTTP response was received
    pub fn is_network(&self) -> bool {
        self.status().is_none()
    }
}

/// Extract `message` from a JSON error body like `{"message": "..."}`
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uses_server_message() {
        let err = ApiError::from_http_status(
            Operation::Create,
            "todos/add",
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"message":"Todo is required"}"#,
        );
        assert_eq!(err.to_string(), "Todo is required");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.operation(), Operation::Create);
    }

    #[test]
    fn test_create_falls_back_to_generic_message() {
        let err = ApiError::from_http_status(
            Operation::Create,
            "todos/add",
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>",
        );
        assert_eq!(err.to_string(), CREATE_FALLBACK_MESSAGE);

        let err = ApiError::from_http_status(
            Operation::Create,
            "todos/add",
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"message":"  "}"#,
        );
        assert_eq!(err.to_string(), CREATE_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_other_operations_report_status() {
        let err = ApiError::from_http_status(
            Operation::Delete,
            "posts/3",
            reqwest::StatusCode::NOT_FOUND,
            "",
        );
        assert!(matches!(err, ApiError::Delete { .. }));
        assert_eq!(err.path(), "posts/3");
        assert!(err.to_string().contains("404"));
        assert!(!err.is_network());
    }

    #[test]
    fn test_new_has_no_status() {
        let err = ApiError::new(Operation::Fetch, "todos", "connection refused");
        assert!(err.is_network());
        assert_eq!(err.to_string(), "Failed to fetch todos: connection refused");
    }
}

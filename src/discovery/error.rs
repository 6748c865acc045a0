//! Discovery Error Types
//!
//! Classification of outbound call failures. The retry layer and the
//! prober both branch on [`FetchError::is_retryable`].

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Longest error message surfaced from a remote body
pub const MAX_ERROR_MESSAGE_CHARS: usize = 280;

/// Errors produced by a single outbound call or a probe sequence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Remote answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The attempt exceeded its time budget
    #[error("The time-tracking API did not respond within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Connection, TLS or body transfer failure
    #[error("Request failed: {0}")]
    Request(String),

    /// No combination was ever attempted successfully and nothing was recorded
    #[error("Unable to fetch data from the time-tracking API.")]
    Exhausted,
}

impl FetchError {
    /// HTTP status code, when the remote produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Client errors (status below 500) will not change on retry.
    /// Network failures, timeouts and 5xx responses may.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Timeout { .. } | FetchError::Request(_) => true,
            FetchError::Exhausted => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest includes the URL, which may carry person ids; keep only the cause
        FetchError::Request(sanitize_message(&e.without_url().to_string()))
    }
}

/// Strip HTML tags, collapse whitespace and cap the length of a message
/// taken from a remote response.
pub fn sanitize_message(raw: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));

    let without_tags = tags.replace_all(raw, " ");
    let collapsed = spaces.replace_all(&without_tags, " ");
    collapsed.trim().chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_terminal() {
        let err = FetchError::Status {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_retryable());

        let err = FetchError::Status {
            status: 499,
            message: "x".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_and_network_errors_retry() {
        let err = FetchError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert!(err.is_retryable());
        assert!(FetchError::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(FetchError::Request("reset".into()).is_retryable());
        assert_eq!(FetchError::Timeout { timeout_ms: 10 }.status(), None);
    }

    #[test]
    fn test_sanitize_strips_html() {
        let html = "<html>\n<body><h1>502   Bad\tGateway</h1></body></html>";
        assert_eq!(sanitize_message(html), "502 Bad Gateway");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "a".repeat(1000);
        assert_eq!(sanitize_message(&long).len(), MAX_ERROR_MESSAGE_CHARS);
        assert_eq!(sanitize_message("   "), "");
    }
}

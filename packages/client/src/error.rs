// ABOUTME: Error type returned by every ApiClient call
// ABOUTME: Distinguishes timeouts, transport failures, server rejections and unparseable bodies

use thiserror::Error;

/// Status code reported for failures that never produced an HTTP response:
/// transport errors and request bodies that could not be encoded.
pub const TRANSPORT_STATUS: u16 = 0;

/// Status code reported when a request exceeds its timeout budget.
pub const TIMEOUT_STATUS: u16 = 408;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request timeout")]
    Timeout,

    /// DNS, connection refused, reset, TLS, ...
    #[error("{message}")]
    Transport { message: String },

    /// The server answered with a non-success status. `message` is the
    /// server's `message` field verbatim when it supplied one.
    #[error("{}", describe_rejection(.status, .message))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// A success response whose non-empty body did not match the expected shape.
    #[error("Failed to parse response (status {status}): {message}")]
    Parse { status: u16, message: String },

    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            Self::Transport {
                message: "Network error".to_string(),
            }
        } else {
            Self::Transport { message }
        }
    }

    /// Rejection carrying the server's own message.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: Some(message.into()),
        }
    }

    /// Rejection whose body had no usable `message` field.
    pub fn rejected(status: u16) -> Self {
        Self::Server {
            status,
            message: None,
        }
    }

    /// HTTP-status-like code: 408 for timeout, 0 for anything that never
    /// reached the server (transport and encode failures), the response
    /// status otherwise. Use [`is_transport`](Self::is_transport) or
    /// [`is_encode`](Self::is_encode) to tell the two status-0 cases apart.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Timeout => TIMEOUT_STATUS,
            Self::Transport { .. } | Self::Encode(_) => TRANSPORT_STATUS,
            Self::Server { status, .. } | Self::Parse { status, .. } => *status,
        }
    }

    /// Server-provided message for rejections, `None` for everything else.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The request body could not be serialized; nothing was sent.
    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode(_))
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

fn describe_rejection(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request failed with status {}", status),
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Timeout.status_code(), 408);
        assert_eq!(ApiError::transport("connection refused").status_code(), 0);
        assert_eq!(ApiError::server(422, "bad domain").status_code(), 422);
        assert_eq!(
            ApiError::Parse {
                status: 200,
                message: "expected value".to_string()
            }
            .status_code(),
            200
        );
    }

    #[test]
    fn test_server_message_passthrough() {
        let err = ApiError::server(422, "bad domain");
        assert_eq!(err.to_string(), "bad domain");
        assert_eq!(err.server_message(), Some("bad domain"));
        assert!(err.is_server());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_rejection_without_message() {
        let err = ApiError::rejected(503);
        assert_eq!(err.to_string(), "Request failed with status 503");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_empty_transport_message_falls_back() {
        let err = ApiError::transport("");
        assert_eq!(err.to_string(), "Network error");
        assert!(err.is_transport());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_encode_failure_is_not_transport() {
        let err = ApiError::Encode("key must be a string".to_string());
        assert_eq!(err.status_code(), TRANSPORT_STATUS);
        assert!(err.is_encode());
        assert!(!err.is_transport());
        assert!(!ApiError::transport("reset").is_encode());
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(ApiError::Timeout.to_string(), "Request timeout");
        assert!(ApiError::Timeout.is_timeout());
    }
}

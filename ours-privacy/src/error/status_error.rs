//! HTTP status errors, keyed off the response status code.

use std::fmt;

use thiserror::Error;

/// The category of a non-success HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// 400.
    BadRequest,
    /// 401.
    Authentication,
    /// 403.
    PermissionDenied,
    /// 404.
    NotFound,
    /// 422.
    UnprocessableEntity,
    /// 429.
    RateLimit,
    /// Any 5xx.
    InternalServer,
    /// Anything else outside the success range.
    Other,
}

impl StatusKind {
    /// Maps an HTTP status code to its category.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            422 => Self::UnprocessableEntity,
            429 => Self::RateLimit,
            500..=599 => Self::InternalServer,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadRequest => "bad request",
            Self::Authentication => "authentication failed",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::UnprocessableEntity => "unprocessable entity",
            Self::RateLimit => "rate limited",
            Self::InternalServer => "server error",
            Self::Other => "unexpected status",
        };
        f.write_str(name)
    }
}

/// The server answered with a non-success HTTP status.
#[derive(Debug, Error)]
#[error("HTTP {status} ({kind}): {message}")]
pub struct StatusError {
    /// The status category.
    pub kind: StatusKind,
    /// The HTTP status code returned.
    pub status: u16,
    /// Error message extracted from the response body.
    pub message: String,
}

impl StatusError {
    /// Builds the error for a status code, categorizing it.
    pub fn from_status(status: u16, message: String) -> Self {
        Self {
            kind: StatusKind::from_status(status),
            status,
            message,
        }
    }

    /// Whether the transport loop may retry a request that got this
    /// status. Request timeouts, rate limits and 5xx responses are
    /// transient; everything else is not.
    pub fn is_retryable(&self) -> bool {
        self.status == 408 || self.status == 429 || self.status >= 500
    }
}

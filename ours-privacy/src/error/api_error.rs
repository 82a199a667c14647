//! Top-level API error type.

use conversion::{CoercionError, SerializationError};
use thiserror::Error;

use super::{ClientError, StatusError};

/// Top-level error type for all API operations.
///
/// Aggregates every error category, enabling unified handling while
/// preserving the ability to match on a specific category.
///
/// ## Examples
///
/// ```rust,ignore
/// use ours_privacy::error::ApiError;
///
/// fn handle_error(err: ApiError) {
///     match err {
///         ApiError::Client(e) => eprintln!("network error: {e}"),
///         ApiError::Status(e) => eprintln!("server said no: {e}"),
///         ApiError::Coercion(e) => eprintln!("bad response shape: {e}"),
///         ApiError::Serialization(e) => eprintln!("bad request value: {e}"),
///         ApiError::Decode(e) => eprintln!("response was not JSON: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network and connection failures.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Non-success HTTP status responses.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The response body did not match the expected model shape.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// A request value could not be represented on the wire.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The response body was not decodable JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the transport loop may retry the request that produced this
    /// error. Conversion and decode failures are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Client(e) => e.is_retryable(),
            Self::Status(e) => e.is_retryable(),
            Self::Coercion(_) | Self::Serialization(_) | Self::Decode(_) => false,
        }
    }
}

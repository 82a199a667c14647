//! Error types for the Ours Privacy client.
//!
//! Errors are organized by category, each in its own module:
//!
//! - [`ApiError`] - Top-level error aggregating all categories
//! - [`ClientError`] - Network and connection failures
//! - [`StatusError`] - Non-success HTTP status responses, keyed by kind
//!
//! Conversion failures ([`conversion::CoercionError`],
//! [`conversion::SerializationError`]) surface through [`ApiError`] as
//! client-side failures, distinct from anything the server did.

mod api_error;
mod client_error;
mod status_error;

pub use api_error::ApiError;
pub use client_error::ClientError;
pub use status_error::{StatusError, StatusKind};

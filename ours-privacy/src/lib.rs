//! Ours Privacy - Server-side SDK for the Ours Privacy tracking API
//!
//! This crate provides an async client for tracking events and managing
//! visitor properties. Request and response bodies go through the
//! [`conversion`] engine, which maps typed models onto the wire format,
//! preserves omit-versus-null intent, and decides whether a request body
//! is safe to retry.
//!
//! ## Modules
//!
//! - [`client`] - HTTP transport, retries and tracing instrumentation
//! - [`services`] - Endpoint groups (`track`, `identify`, `visitor`)
//! - [`track`], [`identify`], [`visitor`] - Per-endpoint request and
//!   response models
//! - [`properties`] - The `DefaultProperties` / `UserProperties` bags
//!   shared by all endpoints
//! - [`request_options`] - Per-call overrides and request assembly
//! - [`error`] - The SDK error taxonomy
//!
//! ## Examples
//!
//! ```rust,ignore
//! use ours_privacy::{Client, EventParams, RequestOptions, UserProperties};
//!
//! let client = Client::new()?;
//! let response = client
//!     .track()
//!     .event(
//!         EventParams::new("tk_live_xxx", "signup")
//!             .with_email(Some("user@example.com".to_string()))
//!             .with_user_properties(Some(
//!                 UserProperties::new().with_first_name(Some("Ada".to_string())),
//!             )),
//!         RequestOptions::new(),
//!     )
//!     .await?;
//! assert!(response.success);
//! ```

pub mod client;
pub mod error;
pub mod identify;
pub mod properties;
pub mod request_options;
pub mod services;
pub mod track;
pub mod visitor;

pub use client::{Client, ClientBuilder, BASE_URL_ENV, DEFAULT_BASE_URL, SDK_USER_AGENT};
pub use error::{ApiError, ClientError, StatusError, StatusKind};
pub use identify::{CreateOrUpdateParams, NewOrUpdateResponse};
pub use properties::{DefaultProperties, UserProperties};
pub use request_options::{parse_request, parse_request_raw, RequestOptions};
pub use services::{IdentifyService, TrackService, VisitorService};
pub use track::{EventParams, EventResponse};
pub use visitor::{UpsertParams, UpsertResponse};

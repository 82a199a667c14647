//! Visitor property endpoints.

use conversion::ModelType;
use reqwest::Method;
use serde_json::Value;

use crate::client::Client;
use crate::error::ApiError;
use crate::request_options::{parse_request, parse_request_raw, RequestOptions};
use crate::visitor::{UpsertParams, UpsertResponse};

// Upserts share the identify endpoint upstream.
const UPSERT_PATH: &str = "identify";

/// Visitor property endpoints; obtained via [`Client::visitor`].
#[derive(Debug, Clone, Copy)]
pub struct VisitorService<'a> {
    client: &'a Client,
}

impl<'a> VisitorService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Upserts properties onto a visitor.
    ///
    /// ## Errors
    ///
    /// Returns an error if the parameters fail to serialize, the request
    /// fails after exhausting its retry budget, the server returns a
    /// non-success status, or the response body does not parse.
    pub async fn upsert(
        &self,
        params: UpsertParams,
        options: RequestOptions,
    ) -> Result<UpsertResponse, ApiError> {
        let (body, options) = parse_request(params, options)?;
        self.client
            .request(Method::POST, UPSERT_PATH, body, options)
            .await
    }

    /// Like [`VisitorService::upsert`], taking a loose JSON mapping keyed
    /// by local field names. Unknown keys pass through to the wire.
    pub async fn upsert_raw(
        &self,
        params: Value,
        options: RequestOptions,
    ) -> Result<UpsertResponse, ApiError> {
        let (body, options) = parse_request_raw(&UpsertParams::converter(), params, options)?;
        self.client
            .request(Method::POST, UPSERT_PATH, body, options)
            .await
    }
}

//! Visitor identification endpoints.

use conversion::ModelType;
use reqwest::Method;
use serde_json::Value;

use crate::client::Client;
use crate::error::ApiError;
use crate::identify::{CreateOrUpdateParams, NewOrUpdateResponse};
use crate::request_options::{parse_request, parse_request_raw, RequestOptions};

const IDENTIFY_PATH: &str = "identify";

/// Visitor identification endpoints; obtained via [`Client::identify`].
#[derive(Debug, Clone, Copy)]
pub struct IdentifyService<'a> {
    client: &'a Client,
}

impl<'a> IdentifyService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Defines visitor properties on an existing visitor or creates a new
    /// visitor. Does not fire an event.
    ///
    /// ## Errors
    ///
    /// Returns an error if the parameters fail to serialize, the request
    /// fails after exhausting its retry budget, the server returns a
    /// non-success status, or the response body does not parse.
    pub async fn create_or_update(
        &self,
        params: CreateOrUpdateParams,
        options: RequestOptions,
    ) -> Result<NewOrUpdateResponse, ApiError> {
        let (body, options) = parse_request(params, options)?;
        self.client
            .request(Method::POST, IDENTIFY_PATH, body, options)
            .await
    }

    /// Like [`IdentifyService::create_or_update`], taking a loose JSON
    /// mapping keyed by local field names. Unknown keys pass through to
    /// the wire.
    pub async fn create_or_update_raw(
        &self,
        params: Value,
        options: RequestOptions,
    ) -> Result<NewOrUpdateResponse, ApiError> {
        let (body, options) =
            parse_request_raw(&CreateOrUpdateParams::converter(), params, options)?;
        self.client
            .request(Method::POST, IDENTIFY_PATH, body, options)
            .await
    }
}

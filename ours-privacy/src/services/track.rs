//! Event tracking endpoints.

use conversion::ModelType;
use reqwest::Method;
use serde_json::Value;

use crate::client::Client;
use crate::error::ApiError;
use crate::request_options::{parse_request, parse_request_raw, RequestOptions};
use crate::track::{EventParams, EventResponse};

const TRACK_PATH: &str = "track";

/// Event tracking endpoints; obtained via [`Client::track`].
#[derive(Debug, Clone, Copy)]
pub struct TrackService<'a> {
    client: &'a Client,
}

impl<'a> TrackService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Tracks an event from your server.
    ///
    /// ## Errors
    ///
    /// Returns an error if the parameters fail to serialize, the request
    /// fails after exhausting its retry budget, the server returns a
    /// non-success status, or the response body does not parse.
    pub async fn event(
        &self,
        params: EventParams,
        options: RequestOptions,
    ) -> Result<EventResponse, ApiError> {
        let (body, options) = parse_request(params, options)?;
        self.client
            .request(Method::POST, TRACK_PATH, body, options)
            .await
    }

    /// Like [`TrackService::event`], taking a loose JSON mapping keyed by
    /// local field names. Unknown keys pass through to the wire.
    pub async fn event_raw(
        &self,
        params: Value,
        options: RequestOptions,
    ) -> Result<EventResponse, ApiError> {
        let (body, options) = parse_request_raw(&EventParams::converter(), params, options)?;
        self.client
            .request(Method::POST, TRACK_PATH, body, options)
            .await
    }
}

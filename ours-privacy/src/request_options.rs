//! Per-request options and request assembly.
//!
//! [`RequestOptions`] is the caller-supplied overlay merged over the
//! client's defaults. [`parse_request`] is where the conversion engine and
//! the transport meet: it runs the model dump and, if the dump pass
//! cleared the retry latch, forces the effective retry budget to zero.
//! That clamp is a hard override, not a suggestion.

use std::time::Duration;

use conversion::{dump_model, dump_raw, ModelConverter, ParamsModel};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::{ApiError, ClientError};

/// Caller-supplied overrides for a single API call.
///
/// Unset fields fall back to the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Per-call request timeout.
    pub timeout: Option<Duration>,
    /// Per-call retry budget. Forced to zero when the request body cannot
    /// be safely re-sent.
    pub max_retries: Option<u32>,
    /// Additional headers merged onto the request.
    pub extra_headers: HeaderMap,
}

impl RequestOptions {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the per-call retry budget.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Adds an extra header to the request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn extra_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ApiError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ClientError::Connection(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ClientError::Connection(format!("invalid header value: {e}")))?;
        self.extra_headers.insert(name, value);
        Ok(self)
    }
}

/// Runs the dump pass over a typed params model and finalizes the options.
///
/// Returns the wire-ready body and the options with the retry budget
/// clamped to zero if any dumped value cannot be re-sent.
pub fn parse_request<T: ParamsModel>(
    params: T,
    options: RequestOptions,
) -> Result<(Value, RequestOptions), ApiError> {
    let (body, state) = dump_model(params)?;
    Ok((body, clamp_retries(options, state.can_retry())))
}

/// Like [`parse_request`], for loosely-typed mappings from raw call sites.
pub fn parse_request_raw(
    converter: &ModelConverter,
    params: Value,
    options: RequestOptions,
) -> Result<(Value, RequestOptions), ApiError> {
    let (body, state) = dump_raw(converter, params)?;
    Ok((body, clamp_retries(options, state.can_retry())))
}

fn clamp_retries(mut options: RequestOptions, can_retry: bool) -> RequestOptions {
    if !can_retry {
        options.max_retries = Some(0);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use conversion::{field, string, unknown, Field, ModelType, Param, ParamMap};
    use serde_json::json;
    use std::sync::{Arc, OnceLock};

    #[derive(Debug, Default)]
    struct UploadParams {
        name: Field<String>,
        payload: Field<Param>,
    }

    impl ModelType for UploadParams {
        fn converter() -> Arc<ModelConverter> {
            static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
            CONVERTER
                .get_or_init(|| {
                    Arc::new(ModelConverter::new(vec![
                        field("name", string()).optional().nullable(),
                        field("payload", unknown()).optional().nullable(),
                    ]))
                })
                .clone()
        }
    }

    impl ParamsModel for UploadParams {
        fn into_param(self) -> Param {
            let mut map = ParamMap::new();
            map.field("name", self.name, Param::string);
            map.field("payload", self.payload, |p| p);
            Param::Map(map)
        }
    }

    #[test]
    fn test_plain_params_leave_retries_alone() {
        let params = UploadParams {
            name: Field::Set("n".to_string()),
            payload: Field::Unset,
        };
        let options = RequestOptions::new().max_retries(5);
        let (body, options) = parse_request(params, options).unwrap();
        assert_eq!(body, json!({"name": "n"}));
        assert_eq!(options.max_retries, Some(5));
    }

    #[test]
    fn test_stream_params_clamp_retries_to_zero() {
        let params = UploadParams {
            name: Field::Unset,
            payload: Field::Set(Param::stream(std::io::Cursor::new(b"blob".to_vec()))),
        };
        let options = RequestOptions::new().max_retries(5);
        let (_, options) = parse_request(params, options).unwrap();
        assert_eq!(options.max_retries, Some(0));
    }

    #[test]
    fn test_clamp_overrides_unset_budget_too() {
        let params = UploadParams {
            name: Field::Unset,
            payload: Field::Set(Param::stream(std::io::Cursor::new(Vec::new()))),
        };
        let (_, options) = parse_request(params, RequestOptions::new()).unwrap();
        assert_eq!(options.max_retries, Some(0));
    }

    #[test]
    fn test_parse_request_raw_maps_wire_names() {
        let converter = ModelConverter::new(vec![
            field("external_id", string()).wire("externalID").optional().nullable(),
        ]);
        let (body, options) = parse_request_raw(
            &converter,
            json!({"external_id": "abc"}),
            RequestOptions::new(),
        )
        .unwrap();
        assert_eq!(body, json!({"externalID": "abc"}));
        assert_eq!(options.max_retries, None);
    }

    #[test]
    fn test_invalid_extra_header_is_rejected() {
        let result = RequestOptions::new().extra_header("bad header\n", "v");
        assert!(matches!(result, Err(ApiError::Client(_))));
    }
}

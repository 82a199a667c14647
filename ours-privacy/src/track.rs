//! Event tracking models.

use std::sync::{Arc, OnceLock};

use conversion::{
    boolean, field, number, string, unknown, CoercionError, Field, MapOf, ModelConverter,
    ModelType, Param, ParamMap, ParamsModel, ResponseModel,
};
use serde_json::Value;

use crate::properties::{DefaultProperties, UserProperties};

/// Parameters for tracking an event from your server.
///
/// Include at least one of `user_id`, `external_id` or `email` so the event
/// can be associated with an existing user. For optional fields, an
/// explicit null unsets the server-side property and an unset field leaves
/// it unchanged.
#[derive(Debug)]
pub struct EventParams {
    /// The token for your Ours Privacy source.
    pub token: String,
    /// The name of the event to track.
    pub event: String,
    pub default_properties: Field<DefaultProperties>,
    /// An ID to deduplicate events sent from multiple sources.
    pub distinct_id: Field<String>,
    /// Looked up last, after `external_id` and `user_id`.
    pub email: Field<String>,
    /// Properties attached to this event only. Values may include streams;
    /// dumping a stream consumes it, so such a request is never retried.
    pub event_properties: Field<ParamMap>,
    /// The ID of the user in your system; skips email lookup when present.
    pub external_id: Field<String>,
    /// Event timestamp in milliseconds since the epoch.
    pub time: Field<f64>,
    /// The Ours user ID; when present no other lookup is attempted.
    pub user_id: Field<String>,
    pub user_properties: Field<UserProperties>,
}

impl EventParams {
    pub fn new(token: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            event: event.into(),
            default_properties: Field::default(),
            distinct_id: Field::default(),
            email: Field::default(),
            event_properties: Field::default(),
            external_id: Field::default(),
            time: Field::default(),
            user_id: Field::default(),
            user_properties: Field::default(),
        }
    }

    pub fn with_default_properties(mut self, value: Option<DefaultProperties>) -> Self {
        self.default_properties = value.into();
        self
    }

    pub fn with_distinct_id(mut self, value: Option<String>) -> Self {
        self.distinct_id = value.into();
        self
    }

    pub fn with_email(mut self, value: Option<String>) -> Self {
        self.email = value.into();
        self
    }

    pub fn with_event_properties(mut self, value: Option<ParamMap>) -> Self {
        self.event_properties = value.into();
        self
    }

    pub fn with_external_id(mut self, value: Option<String>) -> Self {
        self.external_id = value.into();
        self
    }

    pub fn with_time(mut self, value: Option<f64>) -> Self {
        self.time = value.into();
        self
    }

    pub fn with_user_id(mut self, value: Option<String>) -> Self {
        self.user_id = value.into();
        self
    }

    pub fn with_user_properties(mut self, value: Option<UserProperties>) -> Self {
        self.user_properties = value.into();
        self
    }
}

impl ModelType for EventParams {
    fn converter() -> Arc<ModelConverter> {
        static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
        CONVERTER
            .get_or_init(|| {
                Arc::new(ModelConverter::new(vec![
                    field("token", string()),
                    field("event", string()),
                    field("default_properties", DefaultProperties::converter())
                        .wire("defaultProperties")
                        .optional()
                        .nullable(),
                    field("distinct_id", string())
                        .wire("distinctId")
                        .optional()
                        .nullable(),
                    field("email", string()).optional().nullable(),
                    field("event_properties", Arc::new(MapOf::new(unknown())))
                        .wire("eventProperties")
                        .optional()
                        .nullable(),
                    field("external_id", string())
                        .wire("externalId")
                        .optional()
                        .nullable(),
                    field("time", number()).optional().nullable(),
                    field("user_id", string())
                        .wire("userId")
                        .optional()
                        .nullable(),
                    field("user_properties", UserProperties::converter())
                        .wire("userProperties")
                        .optional()
                        .nullable(),
                ]))
            })
            .clone()
    }
}

impl ParamsModel for EventParams {
    fn into_param(self) -> Param {
        let mut map = ParamMap::new();
        map.insert("token", Param::string(self.token));
        map.insert("event", Param::string(self.event));
        map.field("default_properties", self.default_properties, |p| {
            p.into_param()
        });
        map.field("distinct_id", self.distinct_id, Param::string);
        map.field("email", self.email, Param::string);
        map.field("event_properties", self.event_properties, Param::Map);
        map.field("external_id", self.external_id, Param::string);
        map.field("time", self.time, Param::number);
        map.field("user_id", self.user_id, Param::string);
        map.field("user_properties", self.user_properties, |p| p.into_param());
        Param::Map(map)
    }
}

/// Acknowledgement returned by the track endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventResponse {
    pub success: bool,
}

impl ModelType for EventResponse {
    fn converter() -> Arc<ModelConverter> {
        static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
        CONVERTER
            .get_or_init(|| Arc::new(ModelConverter::new(vec![field("success", boolean())])))
            .clone()
    }
}

impl ResponseModel for EventResponse {
    fn from_coerced(value: Value) -> Result<Self, CoercionError> {
        let success = value
            .get("success")
            .and_then(Value::as_bool)
            .ok_or(CoercionError::MissingRequiredField {
                field: "success",
                path: "$".to_string(),
            })?;
        Ok(Self { success })
    }
}

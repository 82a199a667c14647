//! Visitor property upsert models.
//!
//! Upserts post to the identify endpoint; only the wire spelling of the ID
//! keys distinguishes them from [`crate::identify`] requests.

use std::sync::{Arc, OnceLock};

use conversion::{
    boolean, field, string, CoercionError, Field, ModelConverter, ModelType, Param, ParamMap,
    ParamsModel, ResponseModel,
};
use serde_json::Value;

use crate::properties::{DefaultProperties, UserProperties};

/// Parameters for upserting visitor properties.
#[derive(Debug)]
pub struct UpsertParams {
    /// The token for your Ours Privacy source.
    pub token: String,
    /// Properties to merge onto the visitor; carried by all future events.
    pub user_properties: UserProperties,
    pub default_properties: Field<DefaultProperties>,
    pub email: Field<String>,
    pub external_id: Field<String>,
    pub user_id: Field<String>,
}

impl UpsertParams {
    pub fn new(token: impl Into<String>, user_properties: UserProperties) -> Self {
        Self {
            token: token.into(),
            user_properties,
            default_properties: Field::default(),
            email: Field::default(),
            external_id: Field::default(),
            user_id: Field::default(),
        }
    }

    pub fn with_default_properties(mut self, value: Option<DefaultProperties>) -> Self {
        self.default_properties = value.into();
        self
    }

    pub fn with_email(mut self, value: Option<String>) -> Self {
        self.email = value.into();
        self
    }

    pub fn with_external_id(mut self, value: Option<String>) -> Self {
        self.external_id = value.into();
        self
    }

    pub fn with_user_id(mut self, value: Option<String>) -> Self {
        self.user_id = value.into();
        self
    }
}

impl ModelType for UpsertParams {
    fn converter() -> Arc<ModelConverter> {
        static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
        CONVERTER
            .get_or_init(|| {
                Arc::new(ModelConverter::new(vec![
                    field("token", string()),
                    field("user_properties", UserProperties::converter())
                        .wire("userProperties"),
                    field("default_properties", DefaultProperties::converter())
                        .wire("defaultProperties")
                        .optional()
                        .nullable(),
                    field("email", string()).optional().nullable(),
                    field("external_id", string())
                        .wire("externalId")
                        .optional()
                        .nullable(),
                    field("user_id", string())
                        .wire("userId")
                        .optional()
                        .nullable(),
                ]))
            })
            .clone()
    }
}

impl ParamsModel for UpsertParams {
    fn into_param(self) -> Param {
        let mut map = ParamMap::new();
        map.insert("token", Param::string(self.token));
        map.insert("user_properties", self.user_properties.into_param());
        map.field("default_properties", self.default_properties, |p| {
            p.into_param()
        });
        map.field("email", self.email, Param::string);
        map.field("external_id", self.external_id, Param::string);
        map.field("user_id", self.user_id, Param::string);
        Param::Map(map)
    }
}

/// Acknowledgement returned by a visitor upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertResponse {
    pub success: bool,
}

impl ModelType for UpsertResponse {
    fn converter() -> Arc<ModelConverter> {
        static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
        CONVERTER
            .get_or_init(|| Arc::new(ModelConverter::new(vec![field("success", boolean())])))
            .clone()
    }
}

impl ResponseModel for UpsertResponse {
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

#[cfg(test)]
mod tests {
    use super::*;
    use conversion::dump_model;
    use serde_json::json;

    #[test]
    fn test_upsert_uses_lower_camel_ids() {
        let params = UpsertParams::new("tk", UserProperties::new())
            .with_external_id(Some("crm-7".to_string()))
            .with_user_id(Some("ours-3".to_string()));
        let (body, _) = dump_model(params).unwrap();
        assert_eq!(body["externalId"], json!("crm-7"));
        assert_eq!(body["userId"], json!("ours-3"));
    }
}

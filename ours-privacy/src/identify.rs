//! Visitor identification models.

use std::sync::{Arc, OnceLock};

use conversion::{
    boolean, field, string, CoercionError, Field, ModelConverter, ModelType, Param, ParamMap,
    ParamsModel, ResponseModel,
};
use serde_json::Value;

use crate::properties::{DefaultProperties, UserProperties};

/// Parameters for defining visitor properties on an existing visitor, or
/// creating a new visitor.
///
/// This does not fire an event; to fire one with properties, use the track
/// endpoint instead. Lookup order is `user_id`, then `external_id`, then
/// `email`.
///
/// The identify endpoint spells its ID keys `externalID` / `userID` on the
/// wire, unlike track and upsert which use `externalId` / `userId`.
#[derive(Debug)]
pub struct CreateOrUpdateParams {
    /// The token for your Ours Privacy source.
    pub token: String,
    /// Properties to merge onto the visitor; carried by all future events.
    pub user_properties: UserProperties,
    pub default_properties: Field<DefaultProperties>,
    pub email: Field<String>,
    pub external_id: Field<String>,
    pub user_id: Field<String>,
}

impl CreateOrUpdateParams {
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

impl ModelType for CreateOrUpdateParams {
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
                        .wire("externalID")
                        .optional()
                        .nullable(),
                    field("user_id", string())
                        .wire("userID")
                        .optional()
                        .nullable(),
                ]))
            })
            .clone()
    }
}

impl ParamsModel for CreateOrUpdateParams {
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

/// Acknowledgement returned by the identify endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrUpdateResponse {
    pub success: bool,
}

impl ModelType for NewOrUpdateResponse {
    fn converter() -> Arc<ModelConverter> {
        static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
        CONVERTER
            .get_or_init(|| Arc::new(ModelConverter::new(vec![field("success", boolean())])))
            .clone()
    }
}

impl ResponseModel for NewOrUpdateResponse {
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
    fn test_identify_wire_spelling() {
        let params = CreateOrUpdateParams::new(
            "tk",
            UserProperties::new().with_email(Some("a@b.test".to_string())),
        )
        .with_external_id(Some("crm-7".to_string()))
        .with_user_id(Some("ours-3".to_string()));
        let (body, _) = dump_model(params).unwrap();
        assert_eq!(body["externalID"], json!("crm-7"));
        assert_eq!(body["userID"], json!("ours-3"));
        assert_eq!(body["userProperties"], json!({"email": "a@b.test"}));
    }

    #[test]
    fn test_user_properties_always_present() {
        let (body, _) = dump_model(CreateOrUpdateParams::new("tk", UserProperties::new())).unwrap();
        assert_eq!(body["userProperties"], json!({}));
    }
}

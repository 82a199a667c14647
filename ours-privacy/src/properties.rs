//! Shared visitor property bags.
//!
//! `defaultProperties` and `userProperties` appear on every endpoint with
//! the same shape, so they are defined once here. Wire names inside the
//! bags are snake_case, with two camelCase holdouts (`activeDuration`,
//! `sessionCount`) that the wire contract kept from an older generation.
//! For all fields, an explicit null unsets the property server-side and an
//! unset field leaves it unchanged.

use std::sync::{Arc, OnceLock};

use conversion::{
    field, number, string, unknown, Field, MapOf, ModelConverter, ModelType, Param, ParamMap,
    ParamsModel,
};
use serde_json::{Map, Value};

/// Properties passed onto destinations throughout the Ours app: device,
/// browser, page and attribution context captured alongside an event.
#[derive(Debug, Default)]
pub struct DefaultProperties {
    /// Time the page was active, in milliseconds.
    pub active_duration: Field<f64>,
    pub browser_language: Field<String>,
    pub browser_name: Field<String>,
    pub browser_version: Field<String>,
    pub current_url: Field<String>,
    pub device_model: Field<String>,
    pub device_type: Field<String>,
    pub device_vendor: Field<String>,
    pub duration: Field<f64>,
    pub fbclid: Field<String>,
    pub gclid: Field<String>,
    pub host: Field<String>,
    pub ip: Field<String>,
    /// Deliberately untyped: upstream sends booleans, strings or objects.
    pub is_bot: Field<Value>,
    pub os_name: Field<String>,
    pub os_version: Field<String>,
    pub pathname: Field<String>,
    pub referrer: Field<String>,
    pub referring_domain: Field<String>,
    pub screen_height: Field<f64>,
    pub screen_width: Field<f64>,
    /// Number of sessions seen for this visitor.
    pub session_count: Field<f64>,
    pub title: Field<String>,
    pub user_agent: Field<String>,
    pub utm_campaign: Field<String>,
    pub utm_content: Field<String>,
    pub utm_medium: Field<String>,
    pub utm_source: Field<String>,
    pub utm_term: Field<String>,
}

impl DefaultProperties {
    /// Creates an empty bag; chain `with_*` setters to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_duration(mut self, value: Option<f64>) -> Self {
        self.active_duration = value.into();
        self
    }

    pub fn with_browser_language(mut self, value: Option<String>) -> Self {
        self.browser_language = value.into();
        self
    }

    pub fn with_browser_name(mut self, value: Option<String>) -> Self {
        self.browser_name = value.into();
        self
    }

    pub fn with_browser_version(mut self, value: Option<String>) -> Self {
        self.browser_version = value.into();
        self
    }

    pub fn with_current_url(mut self, value: Option<String>) -> Self {
        self.current_url = value.into();
        self
    }

    pub fn with_device_model(mut self, value: Option<String>) -> Self {
        self.device_model = value.into();
        self
    }

    pub fn with_device_type(mut self, value: Option<String>) -> Self {
        self.device_type = value.into();
        self
    }

    pub fn with_device_vendor(mut self, value: Option<String>) -> Self {
        self.device_vendor = value.into();
        self
    }

    pub fn with_duration(mut self, value: Option<f64>) -> Self {
        self.duration = value.into();
        self
    }

    pub fn with_fbclid(mut self, value: Option<String>) -> Self {
        self.fbclid = value.into();
        self
    }

    pub fn with_gclid(mut self, value: Option<String>) -> Self {
        self.gclid = value.into();
        self
    }

    pub fn with_host(mut self, value: Option<String>) -> Self {
        self.host = value.into();
        self
    }

    pub fn with_ip(mut self, value: Option<String>) -> Self {
        self.ip = value.into();
        self
    }

    pub fn with_is_bot(mut self, value: Option<Value>) -> Self {
        self.is_bot = value.into();
        self
    }

    pub fn with_os_name(mut self, value: Option<String>) -> Self {
        self.os_name = value.into();
        self
    }

    pub fn with_os_version(mut self, value: Option<String>) -> Self {
        self.os_version = value.into();
        self
    }

    pub fn with_pathname(mut self, value: Option<String>) -> Self {
        self.pathname = value.into();
        self
    }

    pub fn with_referrer(mut self, value: Option<String>) -> Self {
        self.referrer = value.into();
        self
    }

    pub fn with_referring_domain(mut self, value: Option<String>) -> Self {
        self.referring_domain = value.into();
        self
    }

    pub fn with_screen_height(mut self, value: Option<f64>) -> Self {
        self.screen_height = value.into();
        self
    }

    pub fn with_screen_width(mut self, value: Option<f64>) -> Self {
        self.screen_width = value.into();
        self
    }

    pub fn with_session_count(mut self, value: Option<f64>) -> Self {
        self.session_count = value.into();
        self
    }

    pub fn with_title(mut self, value: Option<String>) -> Self {
        self.title = value.into();
        self
    }

    pub fn with_user_agent(mut self, value: Option<String>) -> Self {
        self.user_agent = value.into();
        self
    }

    pub fn with_utm_campaign(mut self, value: Option<String>) -> Self {
        self.utm_campaign = value.into();
        self
    }

    pub fn with_utm_content(mut self, value: Option<String>) -> Self {
        self.utm_content = value.into();
        self
    }

    pub fn with_utm_medium(mut self, value: Option<String>) -> Self {
        self.utm_medium = value.into();
        self
    }

    pub fn with_utm_source(mut self, value: Option<String>) -> Self {
        self.utm_source = value.into();
        self
    }

    pub fn with_utm_term(mut self, value: Option<String>) -> Self {
        self.utm_term = value.into();
        self
    }
}

impl ModelType for DefaultProperties {
    fn converter() -> Arc<ModelConverter> {
        static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
        CONVERTER
            .get_or_init(|| {
                Arc::new(ModelConverter::new(vec![
                    field("active_duration", number())
                        .wire("activeDuration")
                        .optional()
                        .nullable(),
                    field("browser_language", string()).optional().nullable(),
                    field("browser_name", string()).optional().nullable(),
                    field("browser_version", string()).optional().nullable(),
                    field("current_url", string()).optional().nullable(),
                    field("device_model", string()).optional().nullable(),
                    field("device_type", string()).optional().nullable(),
                    field("device_vendor", string()).optional().nullable(),
                    field("duration", number()).optional().nullable(),
                    field("fbclid", string()).optional().nullable(),
                    field("gclid", string()).optional().nullable(),
                    field("host", string()).optional().nullable(),
                    field("ip", string()).optional().nullable(),
                    field("is_bot", unknown()).optional().nullable(),
                    field("os_name", string()).optional().nullable(),
                    field("os_version", string()).optional().nullable(),
                    field("pathname", string()).optional().nullable(),
                    field("referrer", string()).optional().nullable(),
                    field("referring_domain", string()).optional().nullable(),
                    field("screen_height", number()).optional().nullable(),
                    field("screen_width", number()).optional().nullable(),
                    field("session_count", number())
                        .wire("sessionCount")
                        .optional()
                        .nullable(),
                    field("title", string()).optional().nullable(),
                    field("user_agent", string()).optional().nullable(),
                    field("utm_campaign", string()).optional().nullable(),
                    field("utm_content", string()).optional().nullable(),
                    field("utm_medium", string()).optional().nullable(),
                    field("utm_source", string()).optional().nullable(),
                    field("utm_term", string()).optional().nullable(),
                ]))
            })
            .clone()
    }
}

impl ParamsModel for DefaultProperties {
    fn into_param(self) -> Param {
        let mut map = ParamMap::new();
        map.field("active_duration", self.active_duration, Param::number);
        map.field("browser_language", self.browser_language, Param::string);
        map.field("browser_name", self.browser_name, Param::string);
        map.field("browser_version", self.browser_version, Param::string);
        map.field("current_url", self.current_url, Param::string);
        map.field("device_model", self.device_model, Param::string);
        map.field("device_type", self.device_type, Param::string);
        map.field("device_vendor", self.device_vendor, Param::string);
        map.field("duration", self.duration, Param::number);
        map.field("fbclid", self.fbclid, Param::string);
        map.field("gclid", self.gclid, Param::string);
        map.field("host", self.host, Param::string);
        map.field("ip", self.ip, Param::string);
        map.field("is_bot", self.is_bot, Param::json);
        map.field("os_name", self.os_name, Param::string);
        map.field("os_version", self.os_version, Param::string);
        map.field("pathname", self.pathname, Param::string);
        map.field("referrer", self.referrer, Param::string);
        map.field("referring_domain", self.referring_domain, Param::string);
        map.field("screen_height", self.screen_height, Param::number);
        map.field("screen_width", self.screen_width, Param::number);
        map.field("session_count", self.session_count, Param::number);
        map.field("title", self.title, Param::string);
        map.field("user_agent", self.user_agent, Param::string);
        map.field("utm_campaign", self.utm_campaign, Param::string);
        map.field("utm_content", self.utm_content, Param::string);
        map.field("utm_medium", self.utm_medium, Param::string);
        map.field("utm_source", self.utm_source, Param::string);
        map.field("utm_term", self.utm_term, Param::string);
        Param::Map(map)
    }
}

/// Properties set on the visitor itself. Existing user properties are
/// updated and all future events carry them.
#[derive(Debug, Default)]
pub struct UserProperties {
    pub city: Field<String>,
    pub company_name: Field<String>,
    /// Consent state; shape is owned by the caller's consent tooling.
    pub consent: Field<Map<String, Value>>,
    pub country: Field<String>,
    /// Free-form caller-defined properties.
    pub custom_properties: Field<Map<String, Value>>,
    pub date_of_birth: Field<String>,
    pub email: Field<String>,
    pub external_id: Field<String>,
    pub fbclid: Field<String>,
    pub first_name: Field<String>,
    pub gclid: Field<String>,
    pub gender: Field<String>,
    pub ip: Field<String>,
    /// Deliberately untyped: upstream sends booleans, strings or objects.
    pub is_bot: Field<Value>,
    pub job_title: Field<String>,
    pub last_name: Field<String>,
    /// Deliberately untyped: accepted in any format the caller has.
    pub phone_number: Field<Value>,
    pub referrer: Field<String>,
    pub referring_domain: Field<String>,
    pub state: Field<String>,
    pub user_agent: Field<String>,
    pub utm_campaign: Field<String>,
    pub utm_source: Field<String>,
    pub utm_term: Field<String>,
    /// Deliberately untyped: postal codes are not numbers everywhere.
    pub zip: Field<Value>,
}

impl UserProperties {
    /// Creates an empty bag; chain `with_*` setters to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, value: Option<String>) -> Self {
        self.city = value.into();
        self
    }

    pub fn with_company_name(mut self, value: Option<String>) -> Self {
        self.company_name = value.into();
        self
    }

    pub fn with_consent(mut self, value: Option<Map<String, Value>>) -> Self {
        self.consent = value.into();
        self
    }

    pub fn with_country(mut self, value: Option<String>) -> Self {
        self.country = value.into();
        self
    }

    pub fn with_custom_properties(mut self, value: Option<Map<String, Value>>) -> Self {
        self.custom_properties = value.into();
        self
    }

    pub fn with_date_of_birth(mut self, value: Option<String>) -> Self {
        self.date_of_birth = value.into();
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

    pub fn with_fbclid(mut self, value: Option<String>) -> Self {
        self.fbclid = value.into();
        self
    }

    pub fn with_first_name(mut self, value: Option<String>) -> Self {
        self.first_name = value.into();
        self
    }

    pub fn with_gclid(mut self, value: Option<String>) -> Self {
        self.gclid = value.into();
        self
    }

    pub fn with_gender(mut self, value: Option<String>) -> Self {
        self.gender = value.into();
        self
    }

    pub fn with_ip(mut self, value: Option<String>) -> Self {
        self.ip = value.into();
        self
    }

    pub fn with_is_bot(mut self, value: Option<Value>) -> Self {
        self.is_bot = value.into();
        self
    }

    pub fn with_job_title(mut self, value: Option<String>) -> Self {
        self.job_title = value.into();
        self
    }

    pub fn with_last_name(mut self, value: Option<String>) -> Self {
        self.last_name = value.into();
        self
    }

    pub fn with_phone_number(mut self, value: Option<Value>) -> Self {
        self.phone_number = value.into();
        self
    }

    pub fn with_referrer(mut self, value: Option<String>) -> Self {
        self.referrer = value.into();
        self
    }

    pub fn with_referring_domain(mut self, value: Option<String>) -> Self {
        self.referring_domain = value.into();
        self
    }

    pub fn with_state(mut self, value: Option<String>) -> Self {
        self.state = value.into();
        self
    }

    pub fn with_user_agent(mut self, value: Option<String>) -> Self {
        self.user_agent = value.into();
        self
    }

    pub fn with_utm_campaign(mut self, value: Option<String>) -> Self {
        self.utm_campaign = value.into();
        self
    }

    pub fn with_utm_source(mut self, value: Option<String>) -> Self {
        self.utm_source = value.into();
        self
    }

    pub fn with_utm_term(mut self, value: Option<String>) -> Self {
        self.utm_term = value.into();
        self
    }

    pub fn with_zip(mut self, value: Option<Value>) -> Self {
        self.zip = value.into();
        self
    }
}

impl ModelType for UserProperties {
    fn converter() -> Arc<ModelConverter> {
        static CONVERTER: OnceLock<Arc<ModelConverter>> = OnceLock::new();
        CONVERTER
            .get_or_init(|| {
                Arc::new(ModelConverter::new(vec![
                    field("city", string()).optional().nullable(),
                    field("company_name", string()).optional().nullable(),
                    field("consent", Arc::new(MapOf::new(unknown()).nullable()))
                        .optional()
                        .nullable(),
                    field("country", string()).optional().nullable(),
                    field(
                        "custom_properties",
                        Arc::new(MapOf::new(unknown()).nullable()),
                    )
                    .optional()
                    .nullable(),
                    field("date_of_birth", string()).optional().nullable(),
                    field("email", string()).optional().nullable(),
                    field("external_id", string()).optional().nullable(),
                    field("fbclid", string()).optional().nullable(),
                    field("first_name", string()).optional().nullable(),
                    field("gclid", string()).optional().nullable(),
                    field("gender", string()).optional().nullable(),
                    field("ip", string()).optional().nullable(),
                    field("is_bot", unknown()).optional().nullable(),
                    field("job_title", string()).optional().nullable(),
                    field("last_name", string()).optional().nullable(),
                    field("phone_number", unknown()).optional().nullable(),
                    field("referrer", string()).optional().nullable(),
                    field("referring_domain", string()).optional().nullable(),
                    field("state", string()).optional().nullable(),
                    field("user_agent", string()).optional().nullable(),
                    field("utm_campaign", string()).optional().nullable(),
                    field("utm_source", string()).optional().nullable(),
                    field("utm_term", string()).optional().nullable(),
                    field("zip", unknown()).optional().nullable(),
                ]))
            })
            .clone()
    }
}

impl ParamsModel for UserProperties {
    fn into_param(self) -> Param {
        let mut map = ParamMap::new();
        map.field("city", self.city, Param::string);
        map.field("company_name", self.company_name, Param::string);
        map.field("consent", self.consent, Param::json_map);
        map.field("country", self.country, Param::string);
        map.field("custom_properties", self.custom_properties, Param::json_map);
        map.field("date_of_birth", self.date_of_birth, Param::string);
        map.field("email", self.email, Param::string);
        map.field("external_id", self.external_id, Param::string);
        map.field("fbclid", self.fbclid, Param::string);
        map.field("first_name", self.first_name, Param::string);
        map.field("gclid", self.gclid, Param::string);
        map.field("gender", self.gender, Param::string);
        map.field("ip", self.ip, Param::string);
        map.field("is_bot", self.is_bot, Param::json);
        map.field("job_title", self.job_title, Param::string);
        map.field("last_name", self.last_name, Param::string);
        map.field("phone_number", self.phone_number, Param::json);
        map.field("referrer", self.referrer, Param::string);
        map.field("referring_domain", self.referring_domain, Param::string);
        map.field("state", self.state, Param::string);
        map.field("user_agent", self.user_agent, Param::string);
        map.field("utm_campaign", self.utm_campaign, Param::string);
        map.field("utm_source", self.utm_source, Param::string);
        map.field("utm_term", self.utm_term, Param::string);
        map.field("zip", self.zip, Param::json);
        Param::Map(map)
    }
}

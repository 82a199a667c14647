//! End-to-end tests against a mock Ours Privacy server.

use std::io::Cursor;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use conversion::{CoerceState, CoercionError, ModelType, Param, ParamMap};
use ours_privacy::{
    ApiError, Client, CreateOrUpdateParams, EventParams, RequestOptions, StatusKind,
    UpsertParams, UserProperties,
};

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .build()
        .expect("client should build against the mock server")
}

#[tokio::test]
async fn minimal_track_event_sends_exact_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track"))
        .and(body_json(json!({"token": "x", "event": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .track()
        .event(EventParams::new("x", "x"), RequestOptions::new())
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn string_success_fails_coercion_with_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": "yes"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .track()
        .event(EventParams::new("x", "x"), RequestOptions::new())
        .await
        .unwrap_err();

    match err {
        ApiError::Coercion(CoercionError::TypeMismatch { path, .. }) => {
            assert_eq!(path, "$.success");
        }
        other => panic!("expected a coercion error, got {other:?}"),
    }
}

#[test]
fn missing_token_fails_coercion() {
    let mut state = CoerceState::new();
    let err = conversion::Converter::coerce(
        EventParams::converter().as_ref(),
        &json!({}),
        &mut state,
    )
    .unwrap_err();

    match err {
        CoercionError::MissingRequiredField { field, .. } => assert_eq!(field, "token"),
        other => panic!("expected a missing-field error, got {other:?}"),
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn retries_after_server_error_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/track"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .track()
        .event(EventParams::new("x", "x"), RequestOptions::new())
        .await
        .unwrap();
    assert!(response.success);
    assert!(logs_contain("retryable status, retrying"));
}

#[tokio::test]
async fn stream_body_is_never_retried() {
    let server = MockServer::start().await;

    // A retry would re-send a body whose stream is already consumed, so
    // exactly one attempt must reach the server even though it fails.
    Mock::given(method("POST"))
        .and(path("/track"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let mut props = ParamMap::new();
    props.insert("report", Param::stream(Cursor::new(b"line1\nline2".to_vec())));
    let params = EventParams::new("x", "export").with_event_properties(Some(props));

    let client = client_for(&server);
    let err = client
        .track()
        .event(params, RequestOptions::new().max_retries(5))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn auth_statuses_map_to_kinds() {
    for (status, kind) in [
        (401, StatusKind::Authentication),
        (403, StatusKind::PermissionDenied),
        (422, StatusKind::UnprocessableEntity),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/track"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .track()
            .event(EventParams::new("x", "x"), RequestOptions::new())
            .await
            .unwrap_err();

        match err {
            ApiError::Status(e) => {
                assert_eq!(e.kind, kind);
                assert_eq!(e.status, status);
                assert_eq!(e.message, "nope");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn rate_limit_exhausts_retry_budget() {
    let server = MockServer::start().await;

    // Initial attempt plus one retry.
    Mock::given(method("POST"))
        .and(path("/track"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_string("slow down"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .track()
        .event(
            EventParams::new("x", "x"),
            RequestOptions::new().max_retries(1),
        )
        .await
        .unwrap_err();

    match err {
        ApiError::Status(e) => {
            assert_eq!(e.kind, StatusKind::RateLimit);
            assert!(e.is_retryable());
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn identify_posts_wire_spelled_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identify"))
        .and(body_json(json!({
            "token": "x",
            "userProperties": {"email": "a@b.test"},
            "externalID": "crm-7",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = CreateOrUpdateParams::new(
        "x",
        UserProperties::new().with_email(Some("a@b.test".to_string())),
    )
    .with_external_id(Some("crm-7".to_string()));
    let response = client
        .identify()
        .create_or_update(params, RequestOptions::new())
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn visitor_upsert_posts_to_identify() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identify"))
        .and(body_json(json!({
            "token": "x",
            "userProperties": {},
            "userId": "ours-3",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params =
        UpsertParams::new("x", UserProperties::new()).with_user_id(Some("ours-3".to_string()));
    let response = client
        .visitor()
        .upsert(params, RequestOptions::new())
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn raw_call_passes_unknown_keys_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track"))
        .and(body_json(json!({
            "token": "x",
            "event": "signup",
            "distinctId": "d-1",
            "not_declared": {"nested": true},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .track()
        .event_raw(
            json!({
                "token": "x",
                "event": "signup",
                "distinct_id": "d-1",
                "not_declared": {"nested": true},
            }),
            RequestOptions::new(),
        )
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn default_headers_reach_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track"))
        .and(header("user-agent", ours_privacy::SDK_USER_AGENT))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .track()
        .event(EventParams::new("x", "x"), RequestOptions::new())
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn extra_headers_reach_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track"))
        .and(header("x-request-source", "batch-job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let options = RequestOptions::new()
        .extra_header("X-Request-Source", "batch-job")
        .unwrap();
    let response = client
        .track()
        .event(EventParams::new("x", "x"), options)
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn per_call_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/track"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .track()
        .event(
            EventParams::new("x", "x"),
            RequestOptions::new()
                .timeout(Duration::from_millis(50))
                .max_retries(0),
        )
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

//! Integration tests for `HttpSessionApi` against a mock session service.

use portico_client::{ClientError, HttpConfig, HttpSessionApi, SessionApi};
use portico_protocol::{AccessCredential, LoginRequest, ProtocolError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =========================================================================
// Helpers
// =========================================================================

async fn client_for(server: &MockServer) -> HttpSessionApi {
    HttpSessionApi::new(HttpConfig::new(server.uri())).expect("client should build")
}

fn callback_request() -> LoginRequest {
    LoginRequest {
        provider_id: "p1".into(),
        code: "code123".into(),
        redirect_url: "https://app/callback".into(),
    }
}

// =========================================================================
// GET /v1/providers
// =========================================================================

#[tokio::test]
async fn test_list_providers_returns_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "p2", "url": "two.example.com", "clientID": "c2"},
            {"id": "p1", "url": "idp.example.com", "clientID": "abc", "name": "Okta"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let providers = client_for(&server).await.list_providers().await.unwrap();

    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].id, "p2");
    assert_eq!(providers[1].client_id, "abc");
    assert_eq!(providers[1].display_name(), "Okta");
}

#[tokio::test]
async fn test_list_providers_server_error_returns_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/providers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.list_providers().await.unwrap_err();

    assert!(
        matches!(err, ClientError::Status { status: 500, ref body } if body == "boom"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_list_providers_named_sends_name_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/providers"))
        .and(query_param("name", "okta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "p1", "url": "idp.example.com", "clientID": "abc"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let providers = client_for(&server)
        .await
        .list_providers_named("okta")
        .await
        .unwrap();

    assert_eq!(providers[0].id, "p1");
}

#[tokio::test]
async fn test_list_providers_malformed_body_returns_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.list_providers().await.unwrap_err();

    assert!(matches!(err, ClientError::Protocol(ProtocolError::Decode(_))));
}

// =========================================================================
// POST /v1/login
// =========================================================================

#[tokio::test]
async fn test_login_posts_json_code_and_returns_access_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "providerID": "p1",
            "code": "code123",
            "redirectURL": "https://app/callback"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessKey": "tok"})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server).await.login(&callback_request()).await.unwrap();

    assert_eq!(resp.access_key.expose(), "tok");
    assert!(resp.id.is_none());
}

#[tokio::test]
async fn test_login_rejected_code_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).await.login(&callback_request()).await.unwrap_err();

    assert!(err.is_rejection());
}

// =========================================================================
// GET /v1/introspect, POST /v1/logout
// =========================================================================

#[tokio::test]
async fn test_introspect_sends_bearer_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/introspect"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1"})))
        .expect(1)
        .mount(&server)
        .await;

    let user = client_for(&server)
        .await
        .introspect(&AccessCredential::new("tok"))
        .await
        .unwrap();

    assert_eq!(user.id, "u1");
}

#[tokio::test]
async fn test_logout_sends_empty_json_object_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logout"))
        .and(header("authorization", "Bearer tok"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .await
        .logout(&AccessCredential::new("tok"))
        .await
        .expect("logout should succeed");
}

#[tokio::test]
async fn test_logout_failure_returns_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/logout"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .logout(&AccessCredential::new("tok"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 502, .. }));
}

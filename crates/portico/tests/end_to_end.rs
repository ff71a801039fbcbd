//! End-to-end tests: a controller built by `PorticoBuilder`, talking HTTP
//! to a mock session service, persisting to a credential file.

use std::sync::Arc;

use portico::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =========================================================================
// Helpers
// =========================================================================

type Controller = HttpSessionController<
    Arc<FileCredentialStore>,
    Arc<MemoryStorage>,
    Arc<RecordingNavigator>,
>;

struct App {
    _dir: TempDir,
    store: Arc<FileCredentialStore>,
    storage: Arc<MemoryStorage>,
    nav: Arc<RecordingNavigator>,
    ctl: Controller,
}

fn app(server: &MockServer) -> App {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileCredentialStore::new(dir.path().join("cookie.json")));
    let storage = Arc::new(MemoryStorage::new());
    let nav = Arc::new(RecordingNavigator::new());
    let ctl = PorticoBuilder::new()
        .service_url(&server.uri())
        .origin("https://app")
        .build(Arc::clone(&store), Arc::clone(&storage), Arc::clone(&nav))
        .expect("controller should build");
    App {
        _dir: dir,
        store,
        storage,
        nav,
        ctl,
    }
}

async fn mount_providers(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/login"))
        .and(body_json(json!({
            "providerID": "p1",
            "code": "code123",
            "redirectURL": "https://app/account/callback"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessKey": "tok"})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_introspect(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/introspect"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1"})))
        .mount(server)
        .await;
}

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test]
async fn test_full_login_and_logout_over_http() {
    let server = MockServer::start().await;
    mount_providers(
        &server,
        json!([{"id": "p1", "url": "idp.example.com", "clientID": "abc"}]),
    )
    .await;
    mount_login(&server).await;
    mount_introspect(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/logout"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let mut app = app(&server);

    // 1. Mount: directory loaded, login chooser shown.
    assert_eq!(app.ctl.initialize().await.unwrap(), Bootstrap::Landed(Route::Login));

    // 2. User picks p1: full-page redirect to the provider.
    let provider = app.ctl.providers()[0].clone();
    let handshake = app.ctl.begin_login_redirect(&provider).unwrap();
    match app.nav.last() {
        Some(Navigation::Assign(url)) => {
            assert!(url.starts_with("https://idp.example.com/oauth2/v1/authorize?"));
            assert!(url.ends_with(&format!("&state={}", handshake.state)));
        }
        other => panic!("expected full-page redirect, got {other:?}"),
    }

    // 3. Provider redirects back with code + state.
    let user = app.ctl.complete_callback("code123", &handshake.state).await.unwrap();
    assert_eq!(user.id, "u1");
    assert!(app.ctl.flags().auth_ready);
    assert_eq!(app.nav.last(), Some(Navigation::Push(Route::Home)));
    assert_eq!(app.store.load().unwrap(), Some(AccessCredential::new("tok")));
    assert!(app.storage.is_empty());

    // 4. Logout.
    app.ctl.end_session().await.unwrap();
    assert_eq!(app.ctl.flags(), UiFlags::default());
    assert_eq!(app.nav.last(), Some(Navigation::Push(Route::Login)));
    assert!(app.store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_introspection_rejected_after_exchange_over_http() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/introspect"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let mut app = app(&server);

    let err = app
        .ctl
        .exchange_code_for_session("code123", "p1", "https://app/account/callback")
        .await
        .unwrap_err();

    assert_eq!(
        err.kind(),
        AuthErrorKind::IntrospectionFailed { credential_persisted: true }
    );
    assert!(app.ctl.flags().login_error);
    assert_eq!(app.store.load().unwrap(), Some(AccessCredential::new("tok")));
}

#[tokio::test]
async fn test_directory_server_error_raises_login_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/providers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let mut app = app(&server);

    let err = app.ctl.initialize().await.unwrap_err();

    assert_eq!(err.kind(), AuthErrorKind::DirectoryUnavailable);
    assert!(app.ctl.flags().login_error);
    assert!(app.nav.history().is_empty());
}

#[tokio::test]
async fn test_builder_rejects_invalid_service_url() {
    let result = PorticoBuilder::new().service_url("::not a url::").build(
        MemoryCredentialStore::new(),
        MemoryStorage::new(),
        RecordingNavigator::new(),
    );

    assert!(matches!(result, Err(PorticoError::Client(ClientError::InvalidUrl(_)))));
}

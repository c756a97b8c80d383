use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use worksphere_auth::{GuardDecision, SessionState, TracingNotifier};
use worksphere_config::PortalConfig;

use crate::context::Portal;

fn config(server_uri: &str, session_file: PathBuf, attach_bearer: bool) -> PortalConfig {
    PortalConfig {
        iam_url: server_uri.to_string(),
        employee_url: server_uri.to_string(),
        asset_url: server_uri.to_string(),
        tenant_url: server_uri.to_string(),
        request_timeout: Duration::from_secs(5),
        attach_bearer,
        callback_port: 8080,
        callback_timeout: Duration::from_secs(300),
        session_file,
    }
}

#[tokio::test]
async fn test_portal_persists_session_to_configured_file() {
    let dir = TempDir::new().unwrap();
    let session_file = dir.path().join("session.toml");

    let portal = Portal::open(
        config("http://localhost:1", session_file.clone(), true),
        Arc::new(TracingNotifier),
    )
    .await
    .unwrap();
    portal.session().establish("acme", "at-1", "rt-1").await.unwrap();

    assert!(session_file.exists());

    let reopened = Portal::open(
        config("http://localhost:1", session_file, true),
        Arc::new(TracingNotifier),
    )
    .await
    .unwrap();
    assert_eq!(
        reopened.session().tenant_name().await.unwrap().as_deref(),
        Some("acme")
    );
}

#[tokio::test]
async fn test_service_clients_attach_bearer_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/employee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let session = SessionState::in_memory();
    session.establish("acme", "at-1", "rt-1").await.unwrap();

    let portal = Portal::with_session(
        config(&server.uri(), PathBuf::from("/unused"), true),
        session.clone(),
        Arc::new(TracingNotifier),
    );
    portal.employees().list().await.unwrap();

    let portal = Portal::with_session(
        config(&server.uri(), PathBuf::from("/unused"), false),
        session,
        Arc::new(TracingNotifier),
    );
    portal.employees().list().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].headers.get("authorization").unwrap(),
        "Bearer at-1"
    );
    assert!(requests[1].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_identity_client_never_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/iamcontroller/validate-tenant"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "ok",
            "data": { "realm": "acme", "redirectURI": "https://idp.test/auth" }
        })))
        .mount(&server)
        .await;

    let session = SessionState::in_memory();
    session.establish("acme", "at-1", "rt-1").await.unwrap();
    let portal = Portal::with_session(
        config(&server.uri(), PathBuf::from("/unused"), true),
        session,
        Arc::new(TracingNotifier),
    );

    portal
        .identity()
        .validate_tenant("acme", "http://localhost:8080")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_route_guard_shares_portal_session() {
    let portal = Portal::with_session(
        config("http://localhost:1", PathBuf::from("/unused"), true),
        SessionState::in_memory(),
        Arc::new(TracingNotifier),
    );

    assert!(!portal.route_guard().navigate("/dashboard").await.is_allowed());

    portal.session().establish("acme", "at-1", "rt-1").await.unwrap();
    assert_eq!(
        portal.route_guard().navigate("/dashboard").await,
        GuardDecision::Allow
    );
}

// ABOUTME: Shared fixtures for the auth integration tests
// ABOUTME: Recording notifier and browser doubles plus identity-service mocks

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use worksphere_auth::{
    AuthError, AuthResult, Browser, IdentityClient, Notice, NoticeLevel, Notifier, PendingLogin,
    RedirectHandler, SessionState, TenantLogin,
};
use worksphere_client::ApiClient;

pub const ORIGIN: &str = "http://localhost:8080";
pub const IDP_URL: &str = "https://idp.example.com/realms/acme/protocol/openid-connect/auth";

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Records opened URLs together with the pending login visible at that moment.
pub struct RecordingBrowser {
    session: SessionState,
    opened: Mutex<Vec<(String, Option<PendingLogin>)>>,
    fail: bool,
}

impl RecordingBrowser {
    pub fn new(session: SessionState) -> Self {
        Self {
            session,
            opened: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(session: SessionState) -> Self {
        Self {
            fail: true,
            ..Self::new(session)
        }
    }

    pub fn opened(&self) -> Vec<(String, Option<PendingLogin>)> {
        self.opened.lock().unwrap().clone()
    }
}

impl Browser for RecordingBrowser {
    fn open(&self, url: &str) -> AuthResult<()> {
        // The store is in-memory, so a blocking peek is safe inside the runtime
        let session = self.session.clone();
        let pending = std::thread::spawn(move || {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(session.pending_login())
                .unwrap()
        })
        .join()
        .unwrap();

        self.opened.lock().unwrap().push((url.to_string(), pending));
        if self.fail {
            return Err(AuthError::BrowserOpen("no display".to_string()));
        }
        Ok(())
    }
}

pub struct Harness {
    pub server: MockServer,
    pub session: SessionState,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            session: SessionState::in_memory(),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn identity(&self) -> IdentityClient {
        IdentityClient::new(ApiClient::new(self.server.uri()))
    }

    pub fn login(&self, browser: Arc<dyn Browser>) -> TenantLogin {
        TenantLogin::new(
            self.identity(),
            self.session.clone(),
            self.notifier.clone(),
            ORIGIN,
        )
        .with_browser(browser)
    }

    pub fn redirect_handler(&self) -> RedirectHandler {
        RedirectHandler::new(self.identity(), self.session.clone(), self.notifier.clone())
    }

    pub async fn mock_tenant_ok(&self, tenant: &str) {
        Mock::given(method("POST"))
            .and(path("/iamcontroller/validate-tenant"))
            .and(body_json(json!({ "tenantName": tenant, "redirectOrigin": ORIGIN })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "message": "Tenant validated",
                "data": { "id": null, "realm": tenant, "redirectURI": IDP_URL }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_exchange_ok(&self, tenant: &str, code: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/iamcontroller/validate-authcode"))
            .and(body_json(json!({ "tenantName": tenant, "authCode": code })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-123",
                "refresh_token": "rt-456",
                "expires_in": 300,
                "token_type": "Bearer"
            })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn exchange_calls(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/iamcontroller/validate-authcode")
            .count()
    }
}

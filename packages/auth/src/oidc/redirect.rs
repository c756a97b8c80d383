// ABOUTME: Phase two of the login saga: authorization code capture and token exchange
// ABOUTME: Drives the AwaitingCode -> Exchanging -> Succeeded | Failed handshake at most once per code

use std::sync::Arc;

use tokio::sync::{watch, Mutex, OnceCell};
use tracing::{debug, info, warn};
use url::{form_urlencoded, Url};

use crate::error::{AuthError, AuthResult};
use crate::guard::Navigation;
use crate::notify::{Notice, Notifier};
use crate::oidc::identity::IdentityClient;
use crate::session::SessionState;

pub const MSG_LOGIN_SUCCESSFUL: &str = "Login successful!";

/// Query parameters delivered to `/oidc/redirect`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectQuery {
    pub code: Option<String>,
    pub session_state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl RedirectQuery {
    /// Parse a query string. Accepts a bare query (`code=..`), one with a
    /// leading `?`, or a request target such as `/oidc/redirect?code=..`.
    pub fn parse(raw: &str) -> Self {
        let query = match raw.split_once('?') {
            Some((_, query)) => query,
            None if raw.contains('=') => raw,
            None => "",
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut parsed = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "code" => parsed.code = value,
                "session_state" => parsed.session_state = value,
                "error" => parsed.error = value,
                "error_description" => parsed.error_description = value,
                _ => {}
            }
        }
        parsed
    }

    pub fn from_url(url: &Url) -> Self {
        Self::parse(url.query().unwrap_or_default())
    }

    /// Error reported by the identity provider instead of a code.
    fn provider_error(&self) -> Option<AuthError> {
        let error = self.error.as_ref()?;
        Some(AuthError::ProviderError(
            self.error_description.clone().unwrap_or_else(|| error.clone()),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitingCode,
    Exchanging,
    Succeeded { tenant_name: String },
    Failed { message: String },
}

impl HandshakeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandshakeState::Succeeded { .. } | HandshakeState::Failed { .. }
        )
    }
}

/// Terminal state of one handshake plus where to go next. On failure the
/// navigation is the return-to-login action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeOutcome {
    pub state: HandshakeState,
    pub navigation: Navigation,
}

impl HandshakeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.state, HandshakeState::Succeeded { .. })
    }

    /// User-facing failure message, if the handshake failed.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            HandshakeState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

pub struct RedirectHandler {
    identity: IdentityClient,
    session: SessionState,
    notifier: Arc<dyn Notifier>,
    /// Most recent code and its shared attempt.
    attempt: Mutex<Option<(String, Arc<OnceCell<HandshakeOutcome>>)>>,
    state: watch::Sender<HandshakeState>,
}

impl RedirectHandler {
    pub fn new(identity: IdentityClient, session: SessionState, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(HandshakeState::AwaitingCode);
        Self {
            identity,
            session,
            notifier,
            attempt: Mutex::new(None),
            state,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<HandshakeState> {
        self.state.subscribe()
    }

    /// Handle one arrival at the redirect route.
    ///
    /// Each distinct code is exchanged at most once. Repeated or concurrent
    /// calls with the same code wait for and return the first outcome. A code
    /// that already established the stored session, e.g. one replayed by a
    /// second handler, succeeds again without touching the session.
    pub async fn handle(&self, query: &RedirectQuery) -> HandshakeOutcome {
        let Some(code) = query.code.clone() else {
            let err = query.provider_error().unwrap_or(AuthError::MissingAuthCode);
            return self.fail(err).await;
        };

        let attempt = {
            let mut slot = self.attempt.lock().await;
            match slot.as_ref() {
                Some((last, cell)) if *last == code => cell.clone(),
                _ => {
                    let cell = Arc::new(OnceCell::new());
                    *slot = Some((code.clone(), cell.clone()));
                    cell
                }
            }
        };

        attempt
            .get_or_init(|| self.exchange(code, query.session_state.clone()))
            .await
            .clone()
    }

    /// Return-to-login action offered after a failure.
    pub fn return_to_login(&self) -> Navigation {
        Navigation::to_login()
    }

    async fn exchange(&self, code: String, session_state: Option<String>) -> HandshakeOutcome {
        match self.session.completed_login(&code).await {
            Ok(Some(tenant_name)) => {
                debug!("Code {}... already completed a login", truncate(&code));
                return self.succeeded(tenant_name);
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to check previous login: {}", e),
        }

        self.state.send_replace(HandshakeState::Exchanging);
        debug!(
            "Received code {}... (session_state {:?})",
            truncate(&code),
            session_state.as_deref().map(truncate)
        );

        match self.try_exchange(&code).await {
            Ok(tenant_name) => {
                info!("Login successful for tenant '{}'", tenant_name);
                self.notifier.notify(Notice::success(MSG_LOGIN_SUCCESSFUL));
                self.succeeded(tenant_name)
            }
            Err(e) => self.fail(e).await,
        }
    }

    fn succeeded(&self, tenant_name: String) -> HandshakeOutcome {
        let state = HandshakeState::Succeeded { tenant_name };
        self.state.send_replace(state.clone());
        HandshakeOutcome {
            state,
            navigation: Navigation::to_dashboard(),
        }
    }

    async fn try_exchange(&self, code: &str) -> AuthResult<String> {
        let pending = self
            .session
            .take_pending_login()
            .await?
            .ok_or(AuthError::MissingTenant)?;

        let tokens = self
            .identity
            .exchange_code(&pending.tenant_name, code)
            .await?;

        self.session
            .establish_for_code(
                code,
                &pending.tenant_name,
                &tokens.access_token,
                &tokens.refresh_token,
            )
            .await?;
        Ok(pending.tenant_name)
    }

    async fn fail(&self, err: AuthError) -> HandshakeOutcome {
        warn!("Login handshake failed: {}", err);

        if let Err(e) = self.session.clear_tokens().await {
            warn!("Failed to clear tokens after failed login: {}", e);
        }

        let message = err.exchange_message();
        self.notifier.notify(Notice::error(message.clone()));

        let state = HandshakeState::Failed { message };
        self.state.send_replace(state.clone());
        HandshakeOutcome {
            state,
            navigation: self.return_to_login(),
        }
    }
}

fn truncate(value: &str) -> String {
    value.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_query_variants() {
        let expected = RedirectQuery {
            code: Some("XYZ".to_string()),
            session_state: Some("S1".to_string()),
            ..Default::default()
        };

        assert_eq!(RedirectQuery::parse("code=XYZ&session_state=S1"), expected);
        assert_eq!(RedirectQuery::parse("?code=XYZ&session_state=S1"), expected);
        assert_eq!(
            RedirectQuery::parse("/oidc/redirect?session_state=S1&code=XYZ"),
            expected
        );
    }

    #[test]
    fn test_parse_decodes_values() {
        let query = RedirectQuery::parse("code=a%2Bb%3D&state=ignored");
        assert_eq!(query.code.as_deref(), Some("a+b="));
        assert_eq!(query.session_state, None);
    }

    #[test]
    fn test_parse_missing_or_empty_code() {
        assert_eq!(RedirectQuery::parse("/oidc/redirect").code, None);
        assert_eq!(RedirectQuery::parse("code=&session_state=S1").code, None);
    }

    #[test]
    fn test_provider_error_prefers_description() {
        let query = RedirectQuery::parse("error=access_denied&error_description=User%20cancelled");
        assert_eq!(
            query.provider_error().unwrap().to_string(),
            "Identity provider returned an error: User cancelled"
        );
    }

    #[test]
    fn test_from_url() {
        let url = Url::parse("http://localhost:8080/oidc/redirect?code=XYZ").unwrap();
        assert_eq!(RedirectQuery::from_url(&url).code.as_deref(), Some("XYZ"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("abcdefghijkl"), "abcdefgh");
        assert_eq!(truncate("äöü"), "äöü");
    }
}

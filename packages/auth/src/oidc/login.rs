// ABOUTME: Phase one of the login saga: tenant resolution and hand-off to the identity provider
// ABOUTME: Normalizes the tenant, records the pending login and opens the authorization URL

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AuthError, AuthResult};
use crate::notify::{Notice, Notifier};
use crate::oidc::identity::IdentityClient;
use crate::session::{PendingLogin, SessionKey, SessionOp, SessionState};

pub const MSG_REDIRECTING: &str = "Redirecting to login page...";

/// Whatever shows the identity provider's login page to the user.
pub trait Browser: Send + Sync {
    fn open(&self, url: &str) -> AuthResult<()>;
}

/// Opens URLs in the operating system's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> AuthResult<()> {
        open::that(url).map_err(|e| {
            AuthError::BrowserOpen(format!("{}. Open this URL manually: {}", e, url))
        })
    }
}

/// Result of a successful phase one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub tenant_name: String,
    pub redirect_uri: String,
    pub pending: PendingLogin,
}

/// Trimmed and lower-cased tenant identifier; empty input is rejected.
pub fn normalize_tenant(input: &str) -> AuthResult<String> {
    let tenant = input.trim().to_lowercase();
    if tenant.is_empty() {
        return Err(AuthError::EmptyTenant);
    }
    Ok(tenant)
}

pub struct TenantLogin {
    identity: IdentityClient,
    session: SessionState,
    notifier: Arc<dyn Notifier>,
    browser: Arc<dyn Browser>,
    redirect_origin: String,
}

impl TenantLogin {
    pub fn new(
        identity: IdentityClient,
        session: SessionState,
        notifier: Arc<dyn Notifier>,
        redirect_origin: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            session,
            notifier,
            browser: Arc::new(SystemBrowser),
            redirect_origin: redirect_origin.into(),
        }
    }

    pub fn with_browser(mut self, browser: Arc<dyn Browser>) -> Self {
        self.browser = browser;
        self
    }

    pub fn redirect_origin(&self) -> &str {
        &self.redirect_origin
    }

    /// Resolve the tenant and record the pending login, without navigating.
    ///
    /// Existing tokens are dropped first. On failure an error notice is
    /// emitted and no tenant state is left behind.
    pub async fn resolve(&self, input: &str) -> AuthResult<LoginRedirect> {
        let tenant_name = match normalize_tenant(input) {
            Ok(tenant) => tenant,
            Err(e) => {
                self.notifier.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        match self.try_resolve(&tenant_name).await {
            Ok(redirect) => Ok(redirect),
            Err(e) => {
                warn!("Login for tenant '{}' failed: {}", tenant_name, e);
                self.discard_tenant_state().await;
                self.notifier.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Phase one end to end: resolve, then send the user to the identity
    /// provider. The pending login is written before the browser opens.
    pub async fn login(&self, input: &str) -> AuthResult<LoginRedirect> {
        let redirect = self.resolve(input).await?;

        self.notifier.notify(Notice::info(MSG_REDIRECTING));
        info!("Opening identity provider for tenant '{}'", redirect.tenant_name);

        // The pending record stays so a manually opened URL still completes
        if let Err(e) = self.browser.open(&redirect.redirect_uri) {
            self.notifier.notify(Notice::error(e.to_string()));
            return Err(e);
        }
        Ok(redirect)
    }

    async fn try_resolve(&self, tenant_name: &str) -> AuthResult<LoginRedirect> {
        self.session.clear_tokens().await?;

        let validation = self
            .identity
            .validate_tenant(tenant_name, &self.redirect_origin)
            .await?;

        let pending = self.session.begin_pending_login(tenant_name).await?;
        Ok(LoginRedirect {
            tenant_name: tenant_name.to_string(),
            redirect_uri: validation.redirect_uri,
            pending,
        })
    }

    async fn discard_tenant_state(&self) {
        let result = self
            .session
            .store()
            .apply(vec![
                SessionOp::Remove(SessionKey::PendingLogin),
                SessionOp::Remove(SessionKey::TenantName),
            ])
            .await;
        if let Err(e) = result {
            warn!("Failed to clear tenant state after failed login: {}", e);
        }
    }
}

// ABOUTME: Builds the portal's shared state from configuration
// ABOUTME: One session store, one HTTP pool and the service clients that use them

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;
use worksphere_api::{AssetService, EmployeeService, TenantService};
use worksphere_auth::{
    FileSessionStore, IdentityClient, Notifier, RedirectHandler, RouteGuard, SessionState,
    TenantLogin,
};
use worksphere_client::ApiClient;
use worksphere_config::PortalConfig;

pub struct Portal {
    config: PortalConfig,
    session: SessionState,
    notifier: Arc<dyn Notifier>,
    http: reqwest::Client,
}

impl Portal {
    /// Open the session file named by `config` and share it across clients.
    pub async fn open(config: PortalConfig, notifier: Arc<dyn Notifier>) -> anyhow::Result<Self> {
        let store = FileSessionStore::open(&config.session_file)
            .await
            .with_context(|| {
                format!(
                    "Failed to open session file {}",
                    config.session_file.display()
                )
            })?;
        debug!("Using session file {}", config.session_file.display());

        Ok(Self::with_session(
            config,
            SessionState::new(Arc::new(store)),
            notifier,
        ))
    }

    pub fn with_session(
        config: PortalConfig,
        session: SessionState,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            session,
            notifier,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    /// Client for `base_url` with the configured timeout and, when enabled,
    /// the session's bearer token.
    pub fn api_client(&self, base_url: &str) -> ApiClient {
        let client = ApiClient::with_http_client(base_url, self.http.clone())
            .with_timeout(self.config.request_timeout);
        if self.config.attach_bearer {
            client.with_token_provider(Arc::new(self.session.clone()))
        } else {
            client
        }
    }

    /// The identity service never receives a bearer token.
    pub fn identity(&self) -> IdentityClient {
        IdentityClient::new(
            ApiClient::with_http_client(&self.config.iam_url, self.http.clone())
                .with_timeout(self.config.request_timeout),
        )
    }

    pub fn employees(&self) -> EmployeeService {
        EmployeeService::new(self.api_client(&self.config.employee_url))
    }

    pub fn assets(&self) -> AssetService {
        AssetService::new(self.api_client(&self.config.asset_url))
    }

    pub fn tenants(&self) -> TenantService {
        TenantService::new(self.api_client(&self.config.tenant_url))
    }

    pub fn tenant_login(&self, redirect_origin: impl Into<String>) -> TenantLogin {
        TenantLogin::new(
            self.identity(),
            self.session.clone(),
            self.notifier.clone(),
            redirect_origin,
        )
    }

    pub fn redirect_handler(&self) -> RedirectHandler {
        RedirectHandler::new(self.identity(), self.session.clone(), self.notifier.clone())
    }

    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.session.clone(), self.notifier.clone())
    }
}

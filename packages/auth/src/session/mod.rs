// ABOUTME: Session state shared by the login handshake, route guard and API clients
// ABOUTME: Injectable key-value store trait with change notifications plus a typed facade over it

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use worksphere_client::TokenProvider;

use crate::error::{AuthError, AuthResult};

/// Capacity of the change-notification channel of each store.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Well-known keys of the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionKey {
    AuthToken,
    RefreshToken,
    TenantName,
    PendingLogin,
    LastAuthCode,
}

impl SessionKey {
    pub const ALL: [SessionKey; 5] = [
        SessionKey::AuthToken,
        SessionKey::RefreshToken,
        SessionKey::TenantName,
        SessionKey::PendingLogin,
        SessionKey::LastAuthCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::AuthToken => "auth_token",
            SessionKey::RefreshToken => "refresh_token",
            SessionKey::TenantName => "tenant_name",
            SessionKey::PendingLogin => "pending_login",
            SessionKey::LastAuthCode => "last_auth_code",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutation inside an atomic [`SessionStore::apply`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOp {
    Set(SessionKey, String),
    Remove(SessionKey),
}

/// Broadcast after every effective store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChanged {
    Set(SessionKey),
    Removed(SessionKey),
    Cleared,
}

/// Persistent key-value store holding the session.
///
/// Implementations serialize all access internally; every method may be
/// called concurrently from several tasks.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: SessionKey) -> AuthResult<Option<String>>;

    /// Apply all operations atomically, in order.
    async fn apply(&self, ops: Vec<SessionOp>) -> AuthResult<()>;

    /// Read and remove `key` in one step.
    async fn take(&self, key: SessionKey) -> AuthResult<Option<String>>;

    /// Remove every key.
    async fn clear(&self) -> AuthResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<SessionChanged>;

    async fn set(&self, key: SessionKey, value: String) -> AuthResult<()> {
        self.apply(vec![SessionOp::Set(key, value)]).await
    }

    async fn remove(&self, key: SessionKey) -> AuthResult<()> {
        self.apply(vec![SessionOp::Remove(key)]).await
    }
}

/// An established session. Valid iff the access token is non-empty; there
/// is no expiry tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub tenant_name: Option<String>,
}

impl Session {
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Written when the browser is sent to the identity provider and consumed
/// when the redirect comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLogin {
    pub tenant_name: String,
    pub created_at: DateTime<Utc>,
}

impl PendingLogin {
    pub fn new(tenant_name: impl Into<String>) -> Self {
        Self {
            tenant_name: tenant_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Typed operations over a shared [`SessionStore`].
#[derive(Clone)]
pub struct SessionState {
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState").finish_non_exhaustive()
    }
}

impl SessionState {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session state backed by a fresh [`MemorySessionStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChanged> {
        self.store.subscribe()
    }

    /// The current session, or `None` when no non-empty access token is stored.
    pub async fn current(&self) -> AuthResult<Option<Session>> {
        let Some(access_token) = self.access_token().await? else {
            return Ok(None);
        };

        Ok(Some(Session {
            access_token,
            refresh_token: non_empty(self.store.get(SessionKey::RefreshToken).await?),
            tenant_name: non_empty(self.store.get(SessionKey::TenantName).await?),
        }))
    }

    pub async fn access_token(&self) -> AuthResult<Option<String>> {
        Ok(non_empty(self.store.get(SessionKey::AuthToken).await?))
    }

    pub async fn tenant_name(&self) -> AuthResult<Option<String>> {
        Ok(non_empty(self.store.get(SessionKey::TenantName).await?))
    }

    /// Storage failures count as "not authenticated".
    pub async fn is_authenticated(&self) -> bool {
        match self.access_token().await {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                false
            }
        }
    }

    /// Persist a freshly exchanged session and drop the pending-login record.
    pub async fn establish(
        &self,
        tenant_name: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> AuthResult<Session> {
        self.establish_ops(tenant_name, access_token, refresh_token, Vec::new())
            .await
    }

    /// Like [`establish`](Self::establish), also recording the authorization
    /// code the tokens were exchanged for, in the same batch.
    pub async fn establish_for_code(
        &self,
        code: &str,
        tenant_name: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> AuthResult<Session> {
        let extra = vec![SessionOp::Set(SessionKey::LastAuthCode, code.to_string())];
        self.establish_ops(tenant_name, access_token, refresh_token, extra)
            .await
    }

    /// Tenant of the live session if it was established from `code`.
    pub async fn completed_login(&self, code: &str) -> AuthResult<Option<String>> {
        let last_code = self.store.get(SessionKey::LastAuthCode).await?;
        if last_code.as_deref() != Some(code) || self.access_token().await?.is_none() {
            return Ok(None);
        }
        self.tenant_name().await
    }

    async fn establish_ops(
        &self,
        tenant_name: &str,
        access_token: &str,
        refresh_token: &str,
        extra: Vec<SessionOp>,
    ) -> AuthResult<Session> {
        if access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse);
        }

        let mut ops = vec![
            SessionOp::Set(SessionKey::AuthToken, access_token.to_string()),
            SessionOp::Set(SessionKey::RefreshToken, refresh_token.to_string()),
            SessionOp::Set(SessionKey::TenantName, tenant_name.to_string()),
            SessionOp::Remove(SessionKey::PendingLogin),
        ];
        ops.extend(extra);
        self.store.apply(ops).await?;

        debug!("Session established for tenant {}", tenant_name);
        Ok(Session {
            access_token: access_token.to_string(),
            refresh_token: non_empty(Some(refresh_token.to_string())),
            tenant_name: Some(tenant_name.to_string()),
        })
    }

    /// Drop access and refresh tokens, keep everything else.
    pub async fn clear_tokens(&self) -> AuthResult<()> {
        self.store
            .apply(vec![
                SessionOp::Remove(SessionKey::AuthToken),
                SessionOp::Remove(SessionKey::RefreshToken),
            ])
            .await
    }

    /// Drop tokens and the tenant identifier. An in-flight login survives.
    pub async fn clear_session(&self) -> AuthResult<()> {
        self.store
            .apply(vec![
                SessionOp::Remove(SessionKey::AuthToken),
                SessionOp::Remove(SessionKey::RefreshToken),
                SessionOp::Remove(SessionKey::TenantName),
            ])
            .await
    }

    /// Forget everything, including an in-flight login.
    pub async fn logout(&self) -> AuthResult<()> {
        self.store.clear().await
    }

    pub async fn begin_pending_login(&self, tenant_name: &str) -> AuthResult<PendingLogin> {
        let pending = PendingLogin::new(tenant_name);
        let encoded = serde_json::to_string(&pending)
            .map_err(|e| AuthError::Storage(format!("Failed to encode pending login: {}", e)))?;
        self.store.set(SessionKey::PendingLogin, encoded).await?;
        Ok(pending)
    }

    /// Read and clear the pending-login record. An unreadable record is
    /// discarded and reported as absent.
    pub async fn take_pending_login(&self) -> AuthResult<Option<PendingLogin>> {
        Ok(self
            .store
            .take(SessionKey::PendingLogin)
            .await?
            .and_then(|raw| decode_pending(&raw)))
    }

    pub async fn pending_login(&self) -> AuthResult<Option<PendingLogin>> {
        Ok(self
            .store
            .get(SessionKey::PendingLogin)
            .await?
            .and_then(|raw| decode_pending(&raw)))
    }

    pub async fn clear_pending_login(&self) -> AuthResult<()> {
        self.store.remove(SessionKey::PendingLogin).await
    }
}

#[async_trait]
impl TokenProvider for SessionState {
    async fn bearer_token(&self) -> Option<String> {
        match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read session token for request: {}", e);
                None
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn decode_pending(raw: &str) -> Option<PendingLogin> {
    match serde_json::from_str::<PendingLogin>(raw) {
        Ok(pending) if !pending.tenant_name.is_empty() => Some(pending),
        Ok(_) => None,
        Err(e) => {
            warn!("Discarding unreadable pending login record: {}", e);
            None
        }
    }
}

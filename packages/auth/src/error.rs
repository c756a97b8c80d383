// ABOUTME: Error types for the tenant login and redirect handshake
// ABOUTME: Covers tenant resolution, code capture, token exchange, session storage and the callback listener

use thiserror::Error;
use worksphere_client::ApiError;

pub type AuthResult<T> = Result<T, AuthError>;

pub const MSG_EMPTY_TENANT: &str = "Please enter your tenant name";
pub const MSG_TENANT_VALIDATION_FAILED: &str = "Failed to validate tenant";
pub const MSG_INVALID_TENANT_RESPONSE: &str = "Invalid tenant response";
pub const MSG_MISSING_AUTH_CODE: &str = "Authorization code not found in the URL";
pub const MSG_MISSING_TENANT: &str = "Tenant name not found. Please try logging in again.";
pub const MSG_AUTHENTICATION_FAILED: &str = "Authentication failed. Please try again.";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please enter your tenant name")]
    EmptyTenant,

    /// The identity service refused or garbled the tenant lookup. The
    /// message is the one shown to the user.
    #[error("{0}")]
    TenantResolution(String),

    #[error("Authorization code not found in the URL")]
    MissingAuthCode,

    #[error("Tenant name not found. Please try logging in again.")]
    MissingTenant,

    #[error("Token response is missing access_token or refresh_token")]
    InvalidTokenResponse,

    #[error("Identity provider returned an error: {0}")]
    ProviderError(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Timed out waiting for the login redirect")]
    CallbackTimeout,

    #[error("Failed to open browser: {0}")]
    BrowserOpen(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    /// Text suitable for an error notice after a failed code exchange:
    /// the server's own message when it sent one, the generic retry prompt
    /// otherwise.
    pub fn exchange_message(&self) -> String {
        match self {
            Self::MissingAuthCode | Self::MissingTenant | Self::ProviderError(_) => {
                self.to_string()
            }
            Self::Api(api) => api
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| MSG_AUTHENTICATION_FAILED.to_string()),
            _ => MSG_AUTHENTICATION_FAILED.to_string(),
        }
    }

    /// True for failures of the handshake's own checks: missing input, or an
    /// exchange response without usable tokens. Transport and server errors
    /// are not handshake failures.
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            Self::EmptyTenant
                | Self::MissingAuthCode
                | Self::MissingTenant
                | Self::InvalidTokenResponse
        )
    }
}

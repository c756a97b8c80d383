// ABOUTME: Client for the identity service endpoints used during login
// ABOUTME: Tenant validation and authorization-code exchange with user-facing error mapping

use tracing::{debug, warn};
use worksphere_client::{ApiClient, ApiError};

use crate::error::{
    AuthError, AuthResult, MSG_INVALID_TENANT_RESPONSE, MSG_TENANT_VALIDATION_FAILED,
};
use crate::oidc::types::{
    AuthorizationExchangeResult, TenantValidationResult, ValidateAuthCodeRequest,
    ValidateTenantRequest, ValidateTenantResponse, TENANT_OK_CODE, VALIDATE_AUTHCODE_ENDPOINT,
    VALIDATE_TENANT_ENDPOINT,
};

/// Identity service (`{iam}/iamcontroller/...`).
#[derive(Debug, Clone)]
pub struct IdentityClient {
    api: ApiClient,
}

impl IdentityClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Resolve `tenant_name` to the identity provider's authorization URL.
    pub async fn validate_tenant(
        &self,
        tenant_name: &str,
        redirect_origin: &str,
    ) -> AuthResult<TenantValidationResult> {
        let request = ValidateTenantRequest {
            tenant_name: tenant_name.to_string(),
            redirect_origin: redirect_origin.to_string(),
        };

        let response: ValidateTenantResponse = self
            .api
            .post(VALIDATE_TENANT_ENDPOINT, &request)
            .await
            .map_err(tenant_error)?;

        if response.code != TENANT_OK_CODE {
            warn!(
                "Tenant validation for '{}' returned code {}",
                tenant_name, response.code
            );
            return Err(invalid_tenant_response());
        }

        let data = response.data.ok_or_else(invalid_tenant_response)?;
        let redirect_uri = data
            .redirect_uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(invalid_tenant_response)?;

        debug!("Tenant '{}' resolved to realm {:?}", tenant_name, data.realm);
        Ok(TenantValidationResult {
            tenant_id: data.id,
            realm: data.realm,
            redirect_uri,
        })
    }

    /// Exchange an authorization code for the session token pair.
    pub async fn exchange_code(
        &self,
        tenant_name: &str,
        auth_code: &str,
    ) -> AuthResult<AuthorizationExchangeResult> {
        let request = ValidateAuthCodeRequest {
            tenant_name: tenant_name.to_string(),
            auth_code: auth_code.to_string(),
        };

        let tokens: AuthorizationExchangeResult = self
            .api
            .post(VALIDATE_AUTHCODE_ENDPOINT, &request)
            .await
            .map_err(|e| match e {
                ApiError::Parse { .. } => AuthError::InvalidTokenResponse,
                other => AuthError::Api(other),
            })?;

        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse);
        }
        Ok(tokens)
    }
}

fn invalid_tenant_response() -> AuthError {
    AuthError::TenantResolution(MSG_INVALID_TENANT_RESPONSE.to_string())
}

/// Server message verbatim when the service sent one; otherwise a generic
/// message that depends on whether the body was even readable.
fn tenant_error(err: ApiError) -> AuthError {
    match err {
        ApiError::Parse { .. } => invalid_tenant_response(),
        ApiError::Server {
            message: Some(message),
            ..
        } => AuthError::TenantResolution(message),
        other => {
            warn!("Tenant validation failed: {}", other);
            AuthError::TenantResolution(MSG_TENANT_VALIDATION_FAILED.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_error_mapping() {
        let err = tenant_error(ApiError::server(422, "bad domain"));
        assert_eq!(err.to_string(), "bad domain");

        let err = tenant_error(ApiError::rejected(500));
        assert_eq!(err.to_string(), MSG_TENANT_VALIDATION_FAILED);

        let err = tenant_error(ApiError::Timeout);
        assert_eq!(err.to_string(), MSG_TENANT_VALIDATION_FAILED);

        let err = tenant_error(ApiError::Parse {
            status: 200,
            message: "expected value".to_string(),
        });
        assert_eq!(err.to_string(), MSG_INVALID_TENANT_RESPONSE);
    }
}
